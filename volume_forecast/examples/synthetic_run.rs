use chrono::{Duration, Local, Timelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use volume_forecast::data::{ObservationPoint, ObservationTable};
use volume_forecast::models::{RateModel, SeasonalSmoothing};
use volume_forecast::normalizer::normalize_window;
use volume_forecast::trends::TREND_BLOCKS;
use volume_forecast::{EngineConfig, ForecastEngine, GuidanceSignals, ShiftEstimate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Eight weeks of synthetic hourly readings ending at the current hour
    let now = Local::now().naive_local();
    let end = now.date().and_hms_opt(now.hour(), 0, 0).ok_or("invalid hour")?;
    let start = end - Duration::days(56);
    let mut rng = StdRng::seed_from_u64(7);

    let mut points = Vec::new();
    let mut timestamp = start;
    let mut cumulative: f64 = 0.0;
    while timestamp <= end {
        let hour = timestamp.hour();
        if hour == 0 {
            cumulative = 0.0;
        } else {
            let daytime = if (6..18).contains(&hour) { 1.6 } else { 0.7 };
            cumulative += daytime * rng.gen_range(400.0..600.0);
        }
        points.push(ObservationPoint::new(timestamp, cumulative.round()));
        timestamp += Duration::hours(1);
    }
    let table = ObservationTable::new(points);
    println!("Generated {} hourly readings", table.len());

    // Train a seasonal smoothing oracle
    let oracle = SeasonalSmoothing::new(0.3)?.train(&normalize_window(table.points()))?;

    let signals = GuidanceSignals {
        network_target: 25_000.0,
        short_term_target: 26_500.0,
        secondary_estimate: Some(ShiftEstimate {
            day_shift: 15_500.0,
            night_shift: 10_000.0,
        }),
    };

    let engine = ForecastEngine::new(EngineConfig::default())?;
    let run = engine.run(&table, &oracle, now, &signals);

    println!(
        "Guidance: base {:.3}, next day {:.3}",
        run.guidance.base_scaling, run.guidance.next_day_scaling
    );
    println!("Summary: {:?}", run.summary);

    for shift in &run.upcoming_shifts {
        println!("{:?} shift from {}: {:.0}", shift.kind, shift.start, shift.volume);
    }

    if let Some(trends) = run.trends.as_option() {
        for block in &TREND_BLOCKS {
            if let Some(stats) = trends.block(Weekday::Mon, block) {
                println!(
                    "Monday {}: long {:.1}, short {:.1}, trend {:.2}%",
                    block.label(),
                    stats.long_window_average,
                    stats.short_window_average,
                    stats.trend_pct_change()
                );
            }
        }
    }

    Ok(())
}
