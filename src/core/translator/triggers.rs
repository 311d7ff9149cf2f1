//! Schedule triggers to Quartz cron schedules.
//!
//! Field order is `seconds minutes hours day-of-month month day-of-week`; exactly one of the
//! two day fields is `?`. Weekdays are numbered Sunday=1 through Saturday=7.

use crate::core::ir::{PauseStatus, Schedule};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::values::{array_field, as_u64, str_field, u64_field};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Weekday};
use serde_json::Value;

const SCHEDULE_TRIGGER: &str = "ScheduleTrigger";
const UTC_NAMES: &[&str] = &["UTC", "Coordinated Universal Time", "Etc/UTC"];

/// Translate a trigger definition into a schedule, or `None` when it has no cron equivalent.
pub fn translate_schedule_trigger(
    trigger: &Value,
    timezone_id: &str,
    ctx: &mut TranslationContext,
) -> Option<Schedule> {
    let properties = trigger.get("properties").unwrap_or(trigger);
    let trigger_type = str_field(properties, "type").unwrap_or_default();
    if trigger_type != SCHEDULE_TRIGGER {
        ctx.warn(
            "trigger.type",
            format!("Trigger type '{}' has no schedule equivalent", trigger_type),
        );
        return None;
    }

    let Some(recurrence) = properties
        .get("typeProperties")
        .and_then(|type_properties| type_properties.get("recurrence"))
    else {
        ctx.warn("trigger.recurrence", "Schedule trigger without a recurrence");
        return None;
    };

    if let Some(source_zone) = str_field(recurrence, "timeZone") {
        if !UTC_NAMES.contains(&source_zone) {
            ctx.warn(
                "trigger.recurrence.timeZone",
                format!(
                    "Time zone '{}' is not translated; using '{}'",
                    source_zone, timezone_id
                ),
            );
        }
    }

    let quartz_cron_expression = translate_recurrence(recurrence, ctx)?;
    let pause_status = match str_field(properties, "runtimeState") {
        Some("Stopped") => Some(PauseStatus::Paused),
        Some("Started") => Some(PauseStatus::Unpaused),
        _ => None,
    };
    Some(Schedule {
        quartz_cron_expression,
        timezone_id: timezone_id.to_string(),
        pause_status,
    })
}

/// Cron expression for a recurrence (`frequency`, `interval`, `startTime`, `schedule`).
pub fn translate_recurrence(recurrence: &Value, ctx: &mut TranslationContext) -> Option<String> {
    let frequency = str_field(recurrence, "frequency").unwrap_or_default();
    let interval = match u64_field(recurrence, "interval") {
        Some(interval) if interval >= 1 => interval,
        _ => {
            ctx.warn(
                "trigger.recurrence.interval",
                "Missing or invalid interval; using 1",
            );
            1
        }
    };
    let start = str_field(recurrence, "startTime").and_then(parse_start_time);
    let schedule = recurrence.get("schedule").unwrap_or(&Value::Null);
    if schedule.get("monthlyOccurrences").is_some() {
        ctx.warn(
            "trigger.recurrence.schedule.monthlyOccurrences",
            "Monthly occurrences are not translated",
        );
    }

    let minutes = clock_field(schedule, "minutes", 59, start.map(|s| s.minute()), ctx);
    let hours = clock_field(schedule, "hours", 23, start.map(|s| s.hour()), ctx);
    let cron = match frequency {
        "Minute" => format!("0 {} * * * ?", step(interval)),
        "Hour" => format!("0 {} {} * * ?", minutes, step(interval)),
        "Day" => format!("0 {} {} {} * ?", minutes, hours, step(interval)),
        "Week" => {
            if interval > 1 {
                ctx.warn(
                    "trigger.recurrence.interval",
                    format!("Weekly interval {} is not supported; running every week", interval),
                );
            }
            let days = week_days(schedule, start.map(|s| s.weekday()), ctx);
            format!("0 {} {} ? * {}", minutes, hours, days)
        }
        "Month" => {
            let days = month_days(schedule, start.map(|s| s.day()), ctx);
            format!("0 {} {} {} {} ?", minutes, hours, days, step(interval))
        }
        other => {
            ctx.warn(
                "trigger.recurrence.frequency",
                format!("Unsupported frequency '{}'", other),
            );
            return None;
        }
    };
    tracing::debug!(frequency, interval, cron = %cron, "translated recurrence");
    Some(cron)
}

fn step(interval: u64) -> String {
    if interval == 1 {
        "*".to_string()
    } else {
        format!("*/{}", interval)
    }
}

fn parse_start_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Comma-separated list from `schedule.<key>`, else the start time component, else 0.
fn clock_field(
    schedule: &Value,
    key: &str,
    max: u64,
    fallback: Option<u32>,
    ctx: &mut TranslationContext,
) -> String {
    let mut values: Vec<u64> = Vec::new();
    for value in array_field(schedule, key) {
        match as_u64(value).filter(|value| *value <= max) {
            Some(value) if !values.contains(&value) => values.push(value),
            Some(_) => {}
            None => ctx.warn(
                format!("trigger.recurrence.schedule.{}", key),
                format!("Ignoring invalid value {}", value),
            ),
        }
    }
    if values.is_empty() {
        return fallback.unwrap_or(0).to_string();
    }
    values.sort_unstable();
    join(&values)
}

fn week_days(schedule: &Value, fallback: Option<Weekday>, ctx: &mut TranslationContext) -> String {
    let mut days: Vec<u32> = Vec::new();
    for value in array_field(schedule, "weekDays") {
        match value.as_str().and_then(|name| name.parse::<Weekday>().ok()) {
            Some(day) => {
                let number = day.number_from_sunday();
                if !days.contains(&number) {
                    days.push(number);
                }
            }
            None => ctx.warn(
                "trigger.recurrence.schedule.weekDays",
                format!("Ignoring unknown weekday {}", value),
            ),
        }
    }
    if days.is_empty() {
        days.push(fallback.unwrap_or(Weekday::Sun).number_from_sunday());
    }
    days.sort_unstable();
    join(&days)
}

fn month_days(schedule: &Value, fallback: Option<u32>, ctx: &mut TranslationContext) -> String {
    let mut numbered: Vec<u64> = Vec::new();
    let mut last_day = false;
    for value in array_field(schedule, "monthDays") {
        match value.as_i64() {
            Some(-1) => last_day = true,
            Some(day) if (1..=31).contains(&day) => {
                let day = day as u64;
                if !numbered.contains(&day) {
                    numbered.push(day);
                }
            }
            _ => ctx.warn(
                "trigger.recurrence.schedule.monthDays",
                format!("Ignoring unsupported month day {}", value),
            ),
        }
    }
    if last_day && !numbered.is_empty() {
        ctx.warn(
            "trigger.recurrence.schedule.monthDays",
            "Last day of month cannot be combined with other days; using the last day",
        );
    }
    if last_day {
        return "L".to_string();
    }
    if numbered.is_empty() {
        return fallback.unwrap_or(1).to_string();
    }
    numbered.sort_unstable();
    join(&numbered)
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
