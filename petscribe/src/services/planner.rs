//! Reminder planning
//!
//! Turns care data into `ReminderSpec`s. Planning never talks to the
//! notification service; callers hand the specs over themselves.

use crate::calendar::{age_from, parse_time_of_day, Frequency};
use crate::config::{BIRTHDAY_REMINDER_HOUR, BIRTHDAY_REMINDER_MINUTE};
use crate::error::{AppError, Result};
use crate::models::{ReminderSpec, Trigger};
use chrono::{Datelike, NaiveDate};

/// One-shot reminder for the next bath, at midnight of the due date
pub fn plan_bath_reminder(
    pet_name: &str,
    last_bath: NaiveDate,
    frequency: Frequency,
) -> Result<ReminderSpec> {
    let next = frequency.next_after(last_bath)?;
    let at = next
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Generic(format!("Invalid reminder date: {}", next)))?;

    Ok(ReminderSpec {
        title: "🐾 Bath Time Reminder".to_string(),
        body: format!("It's time to give {} a bath!", pet_name),
        trigger: Trigger::Once { at },
    })
}

fn plan_daily(times_of_day: &[String], title: &str, body: &str) -> Result<Vec<ReminderSpec>> {
    times_of_day
        .iter()
        .map(|time| -> Result<ReminderSpec> {
            let parsed = parse_time_of_day(time)?;
            Ok(ReminderSpec {
                title: title.to_string(),
                body: body.to_string(),
                trigger: Trigger::Daily {
                    hour: parsed.hour,
                    minute: parsed.minute,
                },
            })
        })
        .collect()
}

/// One daily reminder per time of day, in input order
pub fn plan_medication_reminders(
    pet_name: &str,
    med_name: &str,
    times_of_day: &[String],
) -> Result<Vec<ReminderSpec>> {
    plan_daily(
        times_of_day,
        "💊 Medication Reminder",
        &format!("It's time to give {} their {}!", pet_name, med_name),
    )
}

/// One daily reminder per time of day, in input order
pub fn plan_feeding_reminders(
    pet_name: &str,
    food_type: &str,
    amount: &str,
    times_of_day: &[String],
) -> Result<Vec<ReminderSpec>> {
    plan_daily(
        times_of_day,
        "🍽️ Feeding Reminder",
        &format!("It's time to feed {}: {} of {}", pet_name, amount, food_type),
    )
}

/// Yearly reminder on the birthday at 09:00, announcing the age the pet is
/// about to reach as seen from `today`
pub fn plan_birthday_reminder(pet_name: &str, birthday: NaiveDate, today: NaiveDate) -> ReminderSpec {
    let turning = age_from(birthday, today).years + 1;

    ReminderSpec {
        title: format!("🎂 Happy Birthday, {}!", pet_name),
        body: format!("{} turns {} today! 🥳", pet_name, turning),
        trigger: Trigger::Yearly {
            month: birthday.month(),
            day: birthday.day(),
            hour: BIRTHDAY_REMINDER_HOUR,
            minute: BIRTHDAY_REMINDER_MINUTE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FrequencyUnit;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn times(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_bath_reminder_fires_once_on_next_date() {
        let frequency = Frequency::new(2, FrequencyUnit::Weeks).unwrap();
        let spec = plan_bath_reminder("Rex", date(2024, 1, 1), frequency).unwrap();

        assert_eq!(spec.title, "🐾 Bath Time Reminder");
        assert_eq!(spec.body, "It's time to give Rex a bath!");

        let expected: NaiveDateTime = date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(spec.trigger, Trigger::Once { at: expected });
    }

    #[test]
    fn test_medication_reminders_keep_input_order() {
        let specs =
            plan_medication_reminders("Rex", "Heartworm Pill", &times(&["8:30 PM", "7:00 AM"]))
                .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].trigger, Trigger::Daily { hour: 20, minute: 30 });
        assert_eq!(specs[1].trigger, Trigger::Daily { hour: 7, minute: 0 });
        assert_eq!(specs[0].title, "💊 Medication Reminder");
        assert_eq!(specs[0].body, "It's time to give Rex their Heartworm Pill!");
    }

    #[test]
    fn test_medication_reminders_reject_bad_time() {
        let result = plan_medication_reminders("Rex", "Pill", &times(&["8:00 AM", "noonish"]));
        assert!(matches!(result, Err(AppError::InvalidTime(_))));
    }

    #[test]
    fn test_feeding_reminders() {
        let specs =
            plan_feeding_reminders("Mochi", "Kibble", "1 cup", &times(&["12:00 AM"])).unwrap();

        assert_eq!(specs[0].trigger, Trigger::Daily { hour: 0, minute: 0 });
        assert_eq!(specs[0].title, "🍽️ Feeding Reminder");
        assert_eq!(specs[0].body, "It's time to feed Mochi: 1 cup of Kibble");
    }

    #[test]
    fn test_no_times_plans_nothing() {
        assert!(plan_feeding_reminders("Mochi", "Kibble", "1 cup", &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_birthday_reminder_is_yearly_at_nine() {
        let spec = plan_birthday_reminder("Rex", date(2020, 3, 15), date(2024, 3, 10));

        assert_eq!(
            spec.trigger,
            Trigger::Yearly {
                month: 3,
                day: 15,
                hour: 9,
                minute: 0
            }
        );
        assert_eq!(spec.title, "🎂 Happy Birthday, Rex!");
        // Same month as the birthday counts as 4 years, so this announces 5
        assert_eq!(spec.body, "Rex turns 5 today! 🥳");
    }

    #[test]
    fn test_birthday_before_birth_month() {
        let spec = plan_birthday_reminder("Rex", date(2020, 4, 15), date(2024, 3, 10));
        assert_eq!(spec.body, "Rex turns 4 today! 🥳");
    }

    #[test]
    fn test_birthday_set_on_birth_date() {
        let spec = plan_birthday_reminder("Pup", date(2024, 6, 1), date(2024, 6, 1));
        assert_eq!(spec.body, "Pup turns 1 today! 🥳");
    }
}
