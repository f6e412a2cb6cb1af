use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskpulse", about = "Analytics over task tracker exports")]
struct Cli {
    /// Config file (default: ~/.taskpulse/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// JSON file holding an array of tasks
    #[arg(value_name = "TASKS_JSON")]
    tasks: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Task counts per stage
    Funnel {
        #[command(flatten)]
        input: Input,
    },
    /// Completions and revenue per week
    Throughput {
        #[command(flatten)]
        input: Input,
    },
    /// Probability-weighted revenue in open tasks
    Pipeline {
        #[command(flatten)]
        input: Input,
    },
    /// Project weekly revenue forward
    Forecast {
        #[command(flatten)]
        input: Input,
        /// Weeks to project (default: forecastWeeks from config)
        #[arg(long)]
        weeks: Option<usize>,
    },
    /// Average cycle time by priority
    Velocity {
        #[command(flatten)]
        input: Input,
    },
    /// ROI distribution buckets
    Roi {
        #[command(flatten)]
        input: Input,
    },
    /// Revenue by priority and by status
    Revenue {
        #[command(flatten)]
        input: Input,
    },
    /// Revenue, efficiency, ROI, and grade
    Summary {
        #[command(flatten)]
        input: Input,
    },
    /// Every view at once
    Report {
        #[command(flatten)]
        input: Input,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => taskpulse::AnalyticsConfig::load(path)?,
        None => taskpulse::AnalyticsConfig::load_default()?,
    };
    let analytics = taskpulse::TaskAnalytics::new(config)?;

    match cli.command {
        Commands::Funnel { input } => {
            let tasks = load(&input)?;
            let f = analytics.funnel(&tasks);
            if input.json {
                println!("{}", serde_json::to_string_pretty(&f)?);
            } else {
                print_funnel(&f);
            }
        }
        Commands::Throughput { input } => {
            let tasks = load(&input)?;
            let weekly = analytics.throughput(&tasks);
            if input.json {
                println!("{}", serde_json::to_string_pretty(&weekly)?);
            } else {
                print_throughput(&weekly);
            }
        }
        Commands::Pipeline { input } => {
            let tasks = load(&input)?;
            let value = analytics.weighted_pipeline(&tasks);
            if input.json {
                println!("{}", serde_json::json!({ "weightedPipeline": value }));
            } else {
                println!("Weighted Pipeline: ${value:.2}");
            }
        }
        Commands::Forecast { input, weeks } => {
            let tasks = load(&input)?;
            let weeks = weeks.unwrap_or(analytics.config().forecast_weeks);
            let points = analytics.forecast(&tasks, weeks, current_week());
            if input.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print_forecast(&points);
            }
        }
        Commands::Velocity { input } => {
            let tasks = load(&input)?;
            let v = analytics.velocity(&tasks);
            if input.json {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                print_velocity(&v);
            }
        }
        Commands::Roi { input } => {
            let tasks = load(&input)?;
            let buckets = analytics.roi_distribution(&tasks);
            if input.json {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                print_roi(&buckets);
            }
        }
        Commands::Revenue { input } => {
            let tasks = load(&input)?;
            let by_priority = analytics.revenue_by_priority(&tasks);
            let by_status = analytics.revenue_by_status(&tasks);
            if input.json {
                let out = serde_json::json!({
                    "revenueByPriority": by_priority,
                    "revenueByStatus": by_status,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_revenue(&by_priority, &by_status);
            }
        }
        Commands::Summary { input } => {
            let tasks = load(&input)?;
            let m = analytics.metrics(&tasks);
            if input.json {
                println!("{}", serde_json::to_string_pretty(&m)?);
            } else {
                print_metrics(&m);
            }
        }
        Commands::Report { input } => {
            let tasks = load(&input)?;
            let r = analytics.report(&tasks, current_week());
            if input.json {
                println!("{}", serde_json::to_string_pretty(&r)?);
            } else {
                print_metrics(&r.metrics);
                print_funnel(&r.funnel);
                print_throughput(&r.throughput);
                println!("Weighted Pipeline: ${:.2}", r.weighted_pipeline);
                print_forecast(&r.forecast);
                print_velocity(&r.velocity);
                print_roi(&r.roi_distribution);
                print_revenue(&r.revenue_by_priority, &r.revenue_by_status);
            }
        }
    }

    Ok(())
}

fn load(input: &Input) -> anyhow::Result<Vec<taskpulse::DerivedTask>> {
    let tasks = taskpulse::model::load_tasks(&input.tasks)?;
    log::info!("Loaded {} tasks from {}", tasks.len(), input.tasks.display());
    Ok(tasks)
}

fn current_week() -> taskpulse::WeekKey {
    taskpulse::date_util::week_of(&chrono::Utc::now())
}

fn print_funnel(f: &taskpulse::Funnel) {
    println!("Funnel:");
    println!("  Todo:        {}", f.todo);
    println!("  In Progress: {}", f.in_progress);
    println!("  Done:        {}", f.done);
}

fn print_throughput(weekly: &[taskpulse::WeeklyThroughput]) {
    println!("Throughput:");
    if weekly.is_empty() {
        println!("  No completed tasks");
    }
    for w in weekly {
        println!("  {}  {:>4} done  ${:.2}", w.week, w.count, w.revenue);
    }
}

fn print_forecast(points: &[taskpulse::RevenuePoint]) {
    println!("Forecast:");
    for p in points {
        println!("  {}  ${:.2}", p.week, p.revenue);
    }
}

fn print_velocity(v: &taskpulse::Velocity) {
    println!("Velocity (days to complete):");
    for priority in taskpulse::Priority::ALL {
        let pv = v.get(priority);
        if pv.completed == 0 {
            println!("  {:<7} no completed tasks", priority.label());
        } else {
            println!(
                "  {:<7} avg {:.1}  median {:.1}  p90 {:.1}  ({} done)",
                priority.label(),
                pv.avg_days,
                pv.median_days,
                pv.p90_days,
                pv.completed
            );
        }
    }
}

fn print_roi(buckets: &[taskpulse::RoiBucket]) {
    println!("ROI Distribution:");
    for b in buckets {
        println!("  {:<8} {}", b.label, b.count);
    }
}

fn print_revenue(
    by_priority: &[taskpulse::PriorityRevenue],
    by_status: &[taskpulse::StatusRevenue],
) {
    println!("Revenue by Priority:");
    for r in by_priority {
        println!("  {:<12} ${:.2}", r.priority.label(), r.revenue);
    }
    println!("Revenue by Status:");
    for r in by_status {
        println!("  {:<12} ${:.2}", r.status.label(), r.revenue);
    }
}

fn print_metrics(m: &taskpulse::Metrics) {
    println!("Summary:");
    println!("  Total Revenue:   ${:.2}", m.total_revenue);
    println!("  Time Efficiency: {:.0}%", m.time_efficiency_pct);
    println!("  Revenue / Hour:  ${:.1}", m.revenue_per_hour);
    println!("  Average ROI:     {:.1}", m.average_roi);
    println!("  Total Time:      {:.1}h", m.total_time_taken);
    println!("  Grade:           {}", m.performance_grade);
}
