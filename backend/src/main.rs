use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};
use shared::{Appointment, Customer, Staff};
use staff_calendar_backend::config::ScheduleConfig;
use staff_calendar_backend::domain::{CalendarCell, DayView, MonthView, StaffFilter, TimeScale};
use staff_calendar_backend::initialize_backend;
use staff_calendar_backend::storage::InMemoryScheduleRepository;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEMO_STAFF: [&str; 5] = ["Kim", "Lee", "Park", "Choi", "Jung"];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ScheduleConfig::load().context("Failed to load configuration")?;
    let offset = config.utc_offset()?;
    let now = chrono::Utc::now().with_timezone(&offset);
    let today = now.date_naive();

    info!("🌱 Seeding demo data for {}", today);
    let staff = demo_staff(&config, now);
    let appointments = demo_appointments(&staff, &config, today, now);
    let repository = Arc::new(InMemoryScheduleRepository::with_data(staff, appointments));

    let backend = initialize_backend(config.clone(), repository, today).await?;
    let snapshot = backend
        .schedule
        .wait_for(|s| !s.is_loading && s.visible_month.is_some() && !s.staff.is_empty())
        .await?;
    if let Some(err) = snapshot.error() {
        warn!("Showing stale data: {}", err.user_message());
    }

    print_month(&backend.month_view(today));

    let mut pager = backend.new_pager();
    loop {
        let day = backend.day_view(today, TimeScale::Hour, &StaffFilter::new(), &mut pager);
        print_day(&day);
        if !pager.handle_swipe(-(config.swipe_threshold + 1.0)) {
            break;
        }
    }

    backend.shutdown().await;
    info!("✅ Done");
    Ok(())
}

fn demo_staff(config: &ScheduleConfig, now: DateTime<FixedOffset>) -> Vec<Staff> {
    DEMO_STAFF
        .iter()
        .enumerate()
        .map(|(index, name)| Staff {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase()),
            display_name: name.to_string(),
            color: config
                .color_palette
                .get(index)
                .cloned()
                .unwrap_or_else(|| "#808080".to_string()),
            is_admin: index == 0,
            treatment_types: config.default_treatment_types.clone(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// Two 90-minute appointments per staff member today, staggered by two hours,
/// plus one appointment later in the month for the first staff member
fn demo_appointments(
    staff: &[Staff],
    config: &ScheduleConfig,
    today: NaiveDate,
    now: DateTime<FixedOffset>,
) -> Vec<Appointment> {
    let offset = *now.offset();
    let at = |date: NaiveDate, hour: u32| {
        let local = date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour));
        DateTime::<FixedOffset>::from_naive_utc_and_offset(local - offset, offset)
    };
    let treatment = |i: usize| {
        config
            .default_treatment_types
            .get(i % config.default_treatment_types.len().max(1))
            .cloned()
            .unwrap_or_default()
    };

    let mut appointments = Vec::new();
    for (index, member) in staff.iter().enumerate() {
        for i in 0..2 {
            let start_time = at(today, 9 + index as u32 * 2 + i as u32 * 3);
            appointments.push(Appointment {
                id: Uuid::new_v4(),
                user_id: member.id,
                customers: vec![Customer::new(
                    format!("Customer {}-{}", index + 1, i + 1),
                    format!("010-{}-{}", 1000 + index, 5000 + i),
                )],
                treatment_type: treatment(i),
                start_time,
                end_time: start_time + Duration::minutes(90),
                memo: None,
                created_at: now,
                updated_at: now,
            });
        }
    }

    if let (Some(first), Some(later)) = (staff.first(), today.checked_add_signed(Duration::days(3))) {
        if later.month() == today.month() {
            let start_time = at(later, 14);
            appointments.push(Appointment {
                id: Uuid::new_v4(),
                user_id: first.id,
                customers: vec![
                    Customer::new("Mina", "010-1111-2222"),
                    Customer::new("Jisoo", "010-3333-4444"),
                ],
                treatment_type: treatment(1),
                start_time,
                end_time: start_time + Duration::minutes(50),
                memo: Some("Sisters, book together".to_string()),
                created_at: now,
                updated_at: now,
            });
        }
    }

    appointments
}

fn print_month(view: &MonthView) {
    println!("\n{:^35}", view.title);
    println!(
        "{}",
        view.weekday_symbols
            .iter()
            .map(|s| format!("{:^5}", s))
            .collect::<String>()
    );
    for week in view.cells.chunks(7) {
        let line: String = week
            .iter()
            .map(|cell| match cell.cell {
                CalendarCell::Blank => "     ".to_string(),
                CalendarCell::Day(date) => {
                    format!("{:>2}{:<3}", date.day(), "*".repeat(cell.markers.len().min(3)))
                }
            })
            .collect();
        println!("{}", line);
    }
}

fn print_day(view: &DayView) {
    println!(
        "\n{}  [{}]  page {}/{}",
        view.title,
        view.scale.display_name(),
        view.current_page + 1,
        view.page_count.max(1)
    );
    for column in &view.columns {
        println!("  {} ({})", column.staff.display_name, column.staff.color);
        if column.appointments.is_empty() {
            println!("    (free)");
        }
        for positioned in &column.appointments {
            let appointment = &positioned.appointment;
            let customer = appointment
                .primary_customer()
                .map(|c| c.name.as_str())
                .unwrap_or("-");
            let treatment = if positioned.layout.shows_treatment_label() {
                appointment.treatment_type.as_str()
            } else {
                ""
            };
            println!(
                "    {}  {:<16} {:<18} y={:>6.1} h={:>5.1}",
                appointment.time_range_text(),
                customer,
                treatment,
                positioned.layout.top_offset,
                positioned.layout.height
            );
        }
    }
}
