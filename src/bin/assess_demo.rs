//! Runs one assessment per demo context against a scripted scout and prints the JSON responses.

use std::sync::Arc;

use chrono::Utc;
use delay_risk_scout::assessment::{Category, Severity};
use delay_risk_scout::dispatch::ScoutDispatcher;
use delay_risk_scout::registry::SourceRegistry;
use delay_risk_scout::scout::{FixtureScout, Script};
use delay_risk_scout::{Assessor, ShipmentContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    delay_risk_scout::init_tracing();

    let registry = SourceRegistry::load_default()?;
    let scout = FixtureScout::all_clear()
        .with_script(
            "https://www.portoflosangeles.org",
            Script::signals(&[(
                "Terminal congestion: 4 day wait for berth",
                Severity::High,
                Category::Metric,
            )]),
        )
        .with_script(
            "https://www.maersk.com/news/advisories",
            Script::signals(&[(
                "Strike action announced at two terminals",
                Severity::Medium,
                Category::Quote,
            )]),
        );

    let assessor = Assessor::new(Arc::new(registry), ScoutDispatcher::new(Arc::new(scout)));

    let contexts = [
        ShipmentContext::new("Port of Los Angeles", "Maersk").with_mode("Sea"),
        ShipmentContext::new("Shanghai", "MSC"),
        ShipmentContext::new("Port of Atlantis", "Nautilus"),
    ];

    for ctx in &contexts {
        let out = assessor.assess(ctx).await?;
        println!("# {} / {} @ {}", ctx.origin_port, ctx.carrier, Utc::now().to_rfc3339());
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    println!("assess-demo done");
    Ok(())
}
