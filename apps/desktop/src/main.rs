use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, render_list, render_overview, resolve_route,
    view::{display_date, title_case},
    AuthSession, HttpBackend, ListBody, ListDriver, ListIntent, PrescriptionBackend, ResolvedRoute,
    Route,
};
use shared::domain::{parse_input_date, PrescriptionId};

#[derive(Parser, Debug)]
#[command(about = "Prescription desk command-line client")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Bearer token from an earlier sign-in; skips the login call.
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists prescriptions issued between two dates.
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: i64,
    },
    Delete {
        id: i64,
    },
    /// Prescriptions per day.
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url.trim_end_matches('/').to_string();
    }

    let session = AuthSession::new();
    let backend = Arc::new(HttpBackend::new(&settings, session.clone())?);
    match (args.token, args.username, args.password) {
        (Some(token), _, _) => session.sign_in(token),
        (None, Some(username), Some(password)) => {
            let token = backend
                .login(&username, &password)
                .await
                .with_context(|| format!("sign-in as {username} failed"))?;
            session.sign_in(token);
        }
        _ => bail!("pass --token, or --username together with --password"),
    }

    match args.command {
        Command::List { from, to, page } => {
            list(backend, settings.page_size, from, to, page).await
        }
        Command::Show { id } => show(&*backend, &session, PrescriptionId(id)).await,
        Command::Delete { id } => {
            let ack = backend.delete_prescription(PrescriptionId(id)).await?;
            println!(
                "{}",
                if ack.message.is_empty() {
                    "Prescription deleted"
                } else {
                    ack.message.as_str()
                }
            );
            Ok(())
        }
        Command::Report => {
            let overview = render_overview(&backend.daily_counts().await?);
            for row in &overview.rows {
                println!("{:<12} {:>5}", row.date, row.count);
            }
            println!("{:<12} {:>5}", "total", overview.total);
            Ok(())
        }
    }
}

fn parse_date_arg(flag: &str, raw: &str) -> Result<NaiveDate> {
    parse_input_date(raw).ok_or_else(|| anyhow!("--{flag} expects YYYY-MM-DD, got {raw:?}"))
}

async fn list(
    backend: Arc<HttpBackend>,
    page_size: u32,
    from: Option<String>,
    to: Option<String>,
    page: u32,
) -> Result<()> {
    let today = Local::now().date_naive();
    let mut intents = Vec::new();
    if let Some(from) = from {
        intents.push(ListIntent::SetStartDate(parse_date_arg("from", &from)?));
    }
    if let Some(to) = to {
        intents.push(ListIntent::SetEndDate(parse_date_arg("to", &to)?));
    }
    if page > 1 {
        intents.push(ListIntent::GoToPage(page));
    }

    let driver = ListDriver::new(backend, today, page_size);
    driver.mount(today).await;
    driver.wait_idle().await;
    for intent in intents {
        if driver.dispatch(intent).await {
            driver.wait_idle().await;
        }
    }

    let controller = driver.snapshot().await;
    let model = render_list(&controller);
    if let Some(error) = model.error_banner {
        bail!(error);
    }
    if let Some(hint) = model.range_hint {
        eprintln!("note: {hint}");
    }
    let query = controller.query();
    println!("Prescriptions from {} to {}", query.start_date, query.end_date);

    match model.body {
        ListBody::Loading => bail!("list fetch did not finish"),
        ListBody::Empty { message } => println!("{message}"),
        ListBody::Table { rows, pagination } => {
            println!(
                "{:>4}  {:>6}  {:<28} {:>3}  {:<7} {}",
                "#", "id", "patient", "age", "gender", "date"
            );
            for row in rows {
                println!(
                    "{:>4}  {:>6}  {:<28} {:>3}  {:<7} {}",
                    row.sequence, row.id, row.name, row.age, row.gender, row.prescription_date
                );
            }
            println!("{}", pagination.label);
        }
    }
    Ok(())
}

async fn show(
    backend: &dyn PrescriptionBackend,
    session: &AuthSession,
    id: PrescriptionId,
) -> Result<()> {
    let ResolvedRoute::PrescriptionDetail(prescription) =
        resolve_route(Route::PrescriptionDetail(id), session, backend).await?
    else {
        bail!("unexpected route for prescription {id}");
    };

    println!("Patient:      {}", title_case(&prescription.name));
    println!("Age:          {}", prescription.age);
    println!("Gender:       {}", title_case(&prescription.gender));
    println!(
        "Prescribed:   {}",
        display_date(
            prescription.prescription_day(),
            &prescription.prescription_date
        )
    );
    println!(
        "Diagnosis:    {}",
        prescription.diagnosis.as_deref().unwrap_or("-")
    );
    println!(
        "Medicines:    {}",
        prescription.medicines.as_deref().unwrap_or("-")
    );
    if let Some(raw) = prescription.next_visit_date.as_deref() {
        println!(
            "Next visit:   {}",
            display_date(prescription.next_visit_day(), raw)
        );
    }
    Ok(())
}
