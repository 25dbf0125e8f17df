use chrono::{Duration, Utc};
use clap::Parser;
use fake::{
    faker::name::en::{FirstName, LastName},
    Fake,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use schoolhouse::{
    domain::{
        AnnouncementType, ClientInfo, CreateAnnouncementRequest, CreateUserRequest, NameRequest,
        Period, Priority, ScheduleRequest, UserKind, Weekday,
    },
    error::AppError,
    repository::NewUser,
    service::ServiceContext,
};

const CLASSES: [&str; 3] = ["7A", "8B", "9C"];
const SUBJECTS: [&str; 5] = ["Mathematics", "Physics", "Literature", "History", "Biology"];
const LESSONS_PER_DAY: u8 = 4;

#[derive(Parser, Debug)]
#[command(about = "Fill a Schoolhouse database with demo data")]
struct Args {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://schoolhouse.db")]
    database_url: String,

    #[arg(long, default_value_t = 5)]
    students_per_class: usize,

    /// Password given to every seeded account
    #[arg(long, default_value = "password123")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let connect_options = SqliteConnectOptions::from_str(&args.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let ctx = ServiceContext::new(db_pool);
    let client = ClientInfo {
        ip_address: None,
        user_agent: "seed".to_string(),
    };

    println!("👤 Creating admin...");
    let admin = ctx.user_repo.create(
        NewUser {
            username: "admin".to_string(),
            first_name: "School".to_string(),
            last_name: "Administrator".to_string(),
            email: "admin@schoolhouse.local".to_string(),
            password: args.password.clone(),
            is_staff: true,
            is_active: true,
        },
        &UserKind::Admin,
    ).await?;
    let admin_viewer = ctx.viewer_service.resolve(&admin).await?;

    println!("🏫 Creating classes and subjects...");
    let mut classes = Vec::new();
    for name in CLASSES {
        classes.push(ctx.user_service.create_class(admin.id, NameRequest { name: name.to_string() }, &client).await?);
    }
    let mut subjects = Vec::new();
    for name in SUBJECTS {
        subjects.push(ctx.user_service.create_subject(admin.id, NameRequest { name: name.to_string() }, &client).await?);
    }

    println!("🧑‍🏫 Creating teachers...");
    let mut teachers = Vec::new();
    for (i, subject) in subjects.iter().enumerate() {
        let user = ctx.user_service.create_user(admin.id, person(
            format!("teacher{}", i + 1),
            &args.password,
            UserKind::Teacher { subject_ids: vec![subject.id], phone: String::new() },
        ), &client).await?;

        let teacher = ctx.profile_repo.find_teacher_by_user(user.id).await?
            .ok_or_else(|| anyhow::anyhow!("teacher profile missing for {}", user.username))?;
        teachers.push((user, teacher));
    }

    println!("🎒 Creating students...");
    let mut student_count = 0;
    for class in &classes {
        for n in 0..args.students_per_class {
            ctx.user_service.create_user(admin.id, person(
                format!("{}-student{}", class.name.to_lowercase(), n + 1),
                &args.password,
                UserKind::Student { class_id: class.id, phone: String::new() },
            ), &client).await?;
            student_count += 1;
        }
    }
    println!("  ✅ Created {} teachers and {} students", teachers.len(), student_count);

    println!("📅 Building timetables...");
    let mut lessons = 0;
    let mut skipped = 0;
    for (c, class) in classes.iter().enumerate() {
        for (d, day) in Weekday::ALL.into_iter().take(5).enumerate() {
            for number in 1..=LESSONS_PER_DAY {
                // Rotating by class keeps each teacher in one room per slot
                let s = (c + d + number as usize) % subjects.len();
                let Some(period) = Period::new(number) else { continue };

                let request = ScheduleRequest {
                    class_id: class.id,
                    subject_id: subjects[s].id,
                    teacher_id: teachers[s].1.id,
                    day,
                    period,
                    room: format!("{}{:02}", c + 1, s + 1),
                    notes: None,
                };

                match ctx.schedule_service.create(admin.id, request, &client).await {
                    Ok(_) => lessons += 1,
                    Err(AppError::Conflict(_)) => skipped += 1,
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
    println!("  ✅ Scheduled {} lessons ({} skipped on conflicts)", lessons, skipped);

    println!("📢 Posting announcements...");
    let now = Utc::now();
    let mut posted = 0;

    ctx.announcement_service.create(&admin_viewer, announcement(
        "Welcome back",
        "The new term starts on Monday. Timetables are now available in the portal.",
        AnnouncementType::General,
        Priority::High,
        None,
    ), &client).await?;
    posted += 1;

    ctx.announcement_service.create(&admin_viewer, announcement(
        "Sports day",
        "All classes meet on the main field at 09:00.",
        AnnouncementType::Event,
        Priority::Medium,
        Some(now + Duration::days(14)),
    ), &client).await?;
    posted += 1;

    for class in &classes {
        let mut request = announcement(
            "Parent meeting",
            "Parents are invited to the classroom on Thursday evening.",
            AnnouncementType::Class,
            Priority::Medium,
            Some(now + Duration::days(7)),
        );
        request.target_class_id = Some(class.id);
        ctx.announcement_service.create(&admin_viewer, request, &client).await?;
        posted += 1;
    }

    for ((user, _), subject) in teachers.iter().zip(&subjects) {
        let viewer = ctx.viewer_service.resolve(user).await?;
        let mut request = announcement(
            &format!("{} homework", subject.name),
            "Exercises for this week are on the board. Hand them in by Friday.",
            AnnouncementType::Subject,
            Priority::Low,
            Some(now + Duration::days(5)),
        );
        request.target_subject_id = Some(subject.id);
        ctx.announcement_service.create(&viewer, request, &client).await?;
        posted += 1;
    }
    println!("  ✅ Posted {} announcements", posted);

    println!("\n🎉 Seeding complete!");
    println!("  Admin login: admin / {}", args.password);
    println!("  Teacher login: teacher1 / {}", args.password);
    println!("  Student login: {}-student1 / {}", CLASSES[0].to_lowercase(), args.password);

    Ok(())
}

fn person(username: String, password: &str, profile: UserKind) -> CreateUserRequest {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    CreateUserRequest {
        email: format!("{}@schoolhouse.local", username),
        username,
        first_name,
        last_name,
        password: password.to_string(),
        confirm_password: password.to_string(),
        is_active: true,
        profile,
    }
}

fn announcement(
    title: &str,
    content: &str,
    announcement_type: AnnouncementType,
    priority: Priority,
    expiry_at: Option<chrono::DateTime<Utc>>,
) -> CreateAnnouncementRequest {
    CreateAnnouncementRequest {
        title: title.to_string(),
        content: content.to_string(),
        announcement_type,
        priority,
        target_class_id: None,
        target_subject_id: None,
        expiry_at,
        is_active: true,
    }
}
