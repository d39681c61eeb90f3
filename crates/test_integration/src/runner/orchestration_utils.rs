use color_eyre::Result;
use colored::*;
use std::future::Future;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! run_test {
    ($call:expr) => {
        $crate::runner::orchestration_utils::run_test_impl(stringify!($call), $call)
    };
}

/// Runs every listed test, prints a summary and fails if any test failed.
#[macro_export]
macro_rules! execute_suite {
    ($context:expr, [ $($test_fn:ident),* $(,)? ]) => {
        {
            let mut passed: Vec<&str> = Vec::new();
            let mut failed: Vec<&str> = Vec::new();
            let suite_start = Instant::now();
            println!();

            $(
                match run_test!($test_fn($context)).await {
                    Ok(()) => passed.push(stringify!($test_fn)),
                    Err(_) => failed.push(stringify!($test_fn)),
                }
            )*

            println!("{}", "─".repeat(60).truecolor(80, 80, 80));
            println!(
                "{} {}/{} tests passed in {:.2?}.",
                " SUMMARY ".on_purple().black().bold(),
                passed.len(),
                passed.len() + failed.len(),
                suite_start.elapsed()
            );
            for name in &failed {
                println!("  {} {}", "✗".red(), name.red());
            }
            println!("{}", "─".repeat(60).truecolor(80, 80, 80));
            println!();

            if !failed.is_empty() {
                return Err(color_eyre::eyre::eyre!(
                    "{} integration test(s) failed: {}",
                    failed.len(),
                    failed.join(", ")
                ));
            }
        }
    };
}

pub async fn run_test_impl<Fut>(raw_name: &str, test: Fut) -> Result<()>
where
    Fut: Future<Output = Result<()>>,
{
    let name = raw_name.split('(').next().unwrap_or(raw_name).trim();

    println!("{}", "─".repeat(60).truecolor(80, 80, 80));
    println!("{} {}", " RUNNING ".on_cyan().black().bold(), name.cyan().bold());

    let start_time = Instant::now();
    let result = test.await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(()) => {
            println!(
                "{} {} ({:.2?})",
                " PASSED ".on_green().black().bold(),
                name.green(),
                elapsed
            );
        }
        Err(ref e) => {
            println!(
                "{} {} ({:.2?})",
                " FAILED ".on_red().black().bold(),
                name.red(),
                elapsed
            );
            println!("\n{e:?}");
        }
    }

    result
}

pub fn setup_tracing_and_panic_handling() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,sqlx=warn,api=debug,common_services=debug,hyper=error,reqwest=error".into()
    });

    let subscriber = fmt::Subscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    color_eyre::install().expect("Failed to install color_eyre");
}
