use anyhow::Result;
use chrono::Local;
use contracts::usecases::u501_import_productos::TriggerReason;
use cron::Schedule;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::coalescer::TriggerCoalescer;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Фоновый воркер обновления каталога по расписанию.
pub struct ScheduledTaskWorker {
    coalescer: TriggerCoalescer,
    schedule: Schedule,
    expression: String,
}

impl ScheduledTaskWorker {
    pub fn new(coalescer: TriggerCoalescer, expression: &str) -> Result<Self> {
        let schedule = parse_schedule(expression)?;
        Ok(Self {
            coalescer,
            schedule,
            expression: expression.to_string(),
        })
    }

    /// Один запуск сразу, затем по расписанию (локальное время).
    pub async fn run_loop(&self) {
        info!(
            "Catalog refresh scheduler started with expression \"{}\"",
            self.expression
        );
        self.coalescer.trigger(TriggerReason::Startup);

        loop {
            let Some(next) = self.schedule.upcoming(Local).next() else {
                warn!("Cron expression \"{}\" has no upcoming runs", self.expression);
                return;
            };
            debug!("Next scheduled catalog refresh at {}", next);

            let wait = (next - Local::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            self.coalescer.trigger(TriggerReason::Cron);
        }
    }
}

/// Разбирает cron-выражение в формате crontab (5 полей, день недели 0-7, 0 и 7 = воскресенье).
/// Выражения из 6-7 полей (с секундами) передаются в `cron` без изменений.
pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    let normalized = normalize_expression(expression);
    Schedule::from_str(&normalized)
        .map_err(|e| anyhow::anyhow!("Invalid cron expression \"{}\": {}", expression, e))
}

fn normalize_expression(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return fields.join(" ");
    }
    format!(
        "0 {} {} {} {} {}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        weekday_names(fields[4])
    )
}

/// В crontab воскресенье = 0 (или 7), в `cron` дни недели нумеруются с 1.
/// Числа заменяются именами, шаг после '/' не трогается.
fn weekday_names(field: &str) -> String {
    field
        .split(',')
        .map(|part| {
            let (base, step) = match part.split_once('/') {
                Some((base, step)) => (base, Some(step)),
                None => (part, None),
            };
            let base = base
                .split('-')
                .map(|token| match token.parse::<usize>() {
                    Ok(n) if n <= 7 => WEEKDAYS[n % 7].to_string(),
                    _ => token.to_string(),
                })
                .collect::<Vec<_>>()
                .join("-");
            match step {
                Some(step) => format!("{}/{}", base, step),
                None => base,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
