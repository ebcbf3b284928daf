//! Rendering of alert events for the delivery channels.

use engine::{AlertEvent, MoneyCents, UsageStatus};
use teloxide::utils::html;

const APP_NAME: &str = "Budgetify";

/// Everything a channel needs to render one alert.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertMessage {
    pub username: String,
    pub level: UsageStatus,
    pub scope_name: String,
    pub spent: MoneyCents,
    pub limit: MoneyCents,
    /// Unclamped usage.
    pub percentage: f64,
    pub is_overspent: bool,
    pub overspent_amount: Option<MoneyCents>,
}

impl From<&AlertEvent> for AlertMessage {
    fn from(event: &AlertEvent) -> Self {
        Self {
            username: event.username.clone(),
            level: event.level(),
            scope_name: event.scope.display_name(),
            spent: event.spent,
            limit: event.limit,
            percentage: event.percentage,
            is_overspent: event.is_overspent,
            overspent_amount: event.overspent_amount(),
        }
    }
}

impl AlertMessage {
    pub fn headline(&self) -> String {
        match self.level {
            UsageStatus::Exceeded if self.is_overspent && self.percentage > 100.0 => format!(
                "Budget exceeded! You are now {:.1}% over your limit!",
                self.percentage - 100.0
            ),
            UsageStatus::Exceeded => "You have exceeded your budget limit!".to_string(),
            UsageStatus::Critical => "You are at 90% of your budget limit!".to_string(),
            UsageStatus::Warning => "You have reached 80% of your budget limit!".to_string(),
            UsageStatus::Safe => "Your spending is within budget.".to_string(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Budget Alert - {} - {APP_NAME}", self.level.label())
    }

    fn color(&self) -> &'static str {
        match self.level {
            UsageStatus::Exceeded => "#dc2626",
            UsageStatus::Critical => "#f97316",
            UsageStatus::Warning => "#eab308",
            UsageStatus::Safe => "#16a34a",
        }
    }

    pub fn email_html(&self) -> String {
        let row = |label: &str, value: &str, style: &str| {
            format!(
                "<tr><td style=\"padding: 10px; border-bottom: 1px solid #eee;\"><strong>{label}</strong></td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #eee;{style}\">{value}</td></tr>"
            )
        };
        let mut rows = vec![
            row("User:", &html::escape(&self.username), ""),
            row("Limit:", &html::escape(&self.scope_name), ""),
            row("Spent:", &rupees(self.spent), ""),
            row("Budget:", &rupees(self.limit), ""),
            row("Usage:", &format!("{:.1}%", self.percentage), ""),
        ];
        if let Some(over) = self.overspent_amount {
            rows.push(row("Over by:", &rupees(over), " color: #dc2626;"));
        }

        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\
             <h2 style=\"color: {color};\">Budget Alert - {level}</h2>\
             <p style=\"font-size: 16px;\">{headline}</p>\
             <table style=\"width: 100%; border-collapse: collapse;\">{rows}</table>\
             <hr style=\"border: 1px solid #eee; margin: 30px 0;\">\
             <p style=\"color: #999; font-size: 12px;\">This is an automated alert from {APP_NAME}. Please do not reply.</p>\
             </div>",
            color = self.color(),
            level = self.level.label(),
            headline = self.headline(),
            rows = rows.concat(),
        )
    }

    /// Text for Telegram's HTML parse mode.
    pub fn telegram_html(&self) -> String {
        let mut text = format!(
            "<b>Budget Alert - {level}</b>\n\n\
             User: {user}\n\
             Limit: {scope}\n\
             Spent: {spent}\n\
             Budget: {limit}\n\
             Usage: {percentage:.1}%",
            level = self.level.label(),
            user = html::escape(&self.username),
            scope = html::escape(&self.scope_name),
            spent = rupees(self.spent),
            limit = rupees(self.limit),
            percentage = self.percentage,
        );
        if let Some(over) = self.overspent_amount {
            text.push_str(&format!("\nOver by: {}", rupees(over)));
        }
        text.push_str("\n\n");
        text.push_str(&self.headline());
        text
    }
}

fn rupees(amount: MoneyCents) -> String {
    format!("₹{amount}")
}

#[cfg(test)]
mod tests {
    use engine::{AlertScope, Category};

    use super::*;

    fn event(spent: i64, limit: i64, is_overspent: bool, scope: AlertScope) -> AlertEvent {
        let spent = MoneyCents::new(spent * 100);
        let limit = MoneyCents::new(limit * 100);
        AlertEvent {
            username: "alice".to_string(),
            scope,
            spent,
            limit,
            percentage: spent.percentage_of(limit).unwrap(),
            is_overspent,
        }
    }

    #[test]
    fn warning_message() {
        let message = AlertMessage::from(&event(850, 1000, false, AlertScope::Monthly));
        assert_eq!(message.level, UsageStatus::Warning);
        assert_eq!(message.subject(), "Budget Alert - WARNING - Budgetify");
        assert_eq!(message.headline(), "You have reached 80% of your budget limit!");
        assert_eq!(message.overspent_amount, None);

        let text = message.telegram_html();
        assert!(text.starts_with("<b>Budget Alert - WARNING</b>"));
        assert!(text.contains("Limit: Monthly Budget"));
        assert!(text.contains("Spent: ₹850.00"));
        assert!(text.contains("Usage: 85.0%"));
        assert!(!text.contains("Over by"));
    }

    #[test]
    fn repeat_overspend_message() {
        let message = AlertMessage::from(&event(1100, 1000, true, AlertScope::Monthly));
        assert_eq!(message.subject(), "Budget Alert - EXCEEDED - Budgetify");
        assert_eq!(
            message.headline(),
            "Budget exceeded! You are now 10.0% over your limit!"
        );
        assert_eq!(message.overspent_amount, Some(MoneyCents::new(100_00)));
        assert!(message.telegram_html().contains("Over by: ₹100.00"));
        assert!(message.email_html().contains("₹100.00"));
    }

    #[test]
    fn first_exceed_message() {
        let message = AlertMessage::from(&event(1000, 1000, false, AlertScope::Daily));
        assert_eq!(message.headline(), "You have exceeded your budget limit!");
        assert_eq!(message.overspent_amount, Some(MoneyCents::ZERO));
    }

    #[test]
    fn category_scope_and_escaping() {
        let mut alert = event(95, 100, false, AlertScope::Category(Category::Food));
        alert.username = "<bob&co>".to_string();
        let message = AlertMessage::from(&alert);

        assert_eq!(message.level, UsageStatus::Critical);
        let html = message.email_html();
        assert!(html.contains("food (Category)"));
        assert!(html.contains("&lt;bob&amp;co&gt;"));
        assert!(!html.contains("<bob"));
        assert!(message.telegram_html().contains("User: &lt;bob&amp;co&gt;"));
    }
}
