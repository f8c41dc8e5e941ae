//! Long-request probe against `/test/timeout/{minutes}`

use std::time::{Duration, Instant};

use chrono::Local;

use crate::core::bridge::BridgeClient;
use crate::core::render::ConsoleRenderer;
use crate::handlers::input::prompt_confirmation;
use crate::handlers::{Context, HandlerError};

pub const LONG_TEST_MINUTES: f64 = 20.0;
pub const QUICK_TEST_MINUTES: f64 = 1.0;
pub const QUICK_TEST_CLIENT_TIMEOUT: Duration = Duration::from_secs(90);

const QUICK_FAILURE_SECS: f64 = 150.0;
const PARTIAL_FAILURE_SECS: f64 = 1200.0;

/// Why a probe failed, judged by how long it lasted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAnalysis {
    /// Under 2.5 minutes: a short server-side timeout is still active
    QuickTimeout,
    /// Under 20 minutes: the timeout is only partially raised
    PartialTimeout,
    Unexpected,
}

impl FailureAnalysis {
    pub fn classify(elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        if secs < QUICK_FAILURE_SECS {
            FailureAnalysis::QuickTimeout
        } else if secs < PARTIAL_FAILURE_SECS {
            FailureAnalysis::PartialTimeout
        } else {
            FailureAnalysis::Unexpected
        }
    }

    pub fn explanation(&self) -> [&'static str; 2] {
        match self {
            FailureAnalysis::QuickTimeout => [
                "Server timed out very quickly (< 2.5 min)",
                "A short (about 2-minute) server timeout is still active.",
            ],
            FailureAnalysis::PartialTimeout => [
                "Server timed out before expected duration",
                "The timeout configuration may be partially working.",
            ],
            FailureAnalysis::Unexpected => [
                "Unexpected error after significant time",
                "Check the bridge logs for the cause.",
            ],
        }
    }
}

/// Actual duration as a percentage of the expected one
pub fn accuracy_percent(elapsed: Duration, minutes: f64) -> f64 {
    let expected = minutes * 60.0;
    if expected <= 0.0 {
        return 0.0;
    }
    elapsed.as_secs_f64() / expected * 100.0
}

pub fn check_minutes(minutes: f64) -> Result<f64, HandlerError> {
    if minutes.is_finite() && minutes > 0.0 {
        Ok(minutes)
    } else {
        Err(HandlerError::Arguments(format!(
            "MINUTES must be a positive, finite number, got {}",
            minutes
        )))
    }
}

pub fn client_timeout_from_secs(secs: Option<f64>) -> Result<Option<Duration>, HandlerError> {
    let Some(secs) = secs else {
        return Ok(None);
    };
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if secs > 0.0 => Ok(Some(timeout)),
        _ => Err(HandlerError::Arguments(format!(
            "--client-timeout must be a positive number of seconds, got {}",
            secs
        ))),
    }
}

pub async fn run(
    ctx: &Context,
    minutes: Option<f64>,
    client_timeout: Option<f64>,
    yes: bool,
) -> Result<(), HandlerError> {
    let client_timeout = client_timeout_from_secs(client_timeout)?;
    let minutes = minutes.map(check_minutes).transpose()?;

    let client = ctx.client()?;
    let r = &ctx.renderer;

    if let Some(minutes) = minutes {
        return finish(long_test(&client, r, minutes, client_timeout).await);
    }

    println!("🚀 MCP Bridge Long Timeout Test");
    println!("{}", r.separator(60));
    println!("This tests if the server can handle 20-minute requests");
    println!();

    client.health().await?;
    println!("{}", r.success("MCP Bridge is online and healthy"));
    println!();

    if !quick_test(&client, r).await {
        return Err(HandlerError::Failed(
            "Quick test failed, skipping long test".to_string(),
        ));
    }

    println!();
    println!("🎯 Now running the 20-minute timeout test...");
    if !yes && !prompt_confirmation("Start the 20-minute test?")? {
        println!("Cancelled.");
        return Ok(());
    }
    finish(long_test(&client, r, LONG_TEST_MINUTES, client_timeout).await)
}

fn finish(passed: bool) -> Result<(), HandlerError> {
    if passed {
        Ok(())
    } else {
        Err(HandlerError::Failed("timeout test failed".to_string()))
    }
}

async fn quick_test(client: &BridgeClient, r: &ConsoleRenderer) -> bool {
    println!("🚀 Quick Test: 1-minute timeout");
    println!("{}", r.separator(40));
    match client
        .timeout_probe(QUICK_TEST_MINUTES, Some(QUICK_TEST_CLIENT_TIMEOUT))
        .await
    {
        Ok(result) => {
            println!("{}", r.success("Quick test passed!"));
            println!("📊 Response: {}", result);
            true
        }
        Err(e) => {
            println!("{}", r.error(&format!("Quick test failed: {}", e)));
            false
        }
    }
}

async fn long_test(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    minutes: f64,
    client_timeout: Option<Duration>,
) -> bool {
    let now = Local::now();
    let expected = chrono::Duration::try_milliseconds((minutes * 60_000.0) as i64)
        .and_then(|offset| now.checked_add_signed(offset));

    println!("🧪 Testing {}-minute server timeout...", minutes);
    println!("📡 URL: {}/test/timeout/{}", client.base_url(), minutes);
    println!("⏰ Start time: {}", now.format("%H:%M:%S"));
    if let Some(expected) = expected {
        println!("🎯 Expected completion: {}", expected.format("%H:%M:%S"));
    }
    println!();
    println!("⚠️  This test will run for the FULL duration!");
    match client_timeout {
        Some(timeout) => println!("⚠️  Client timeout: {:.0} seconds", timeout.as_secs_f64()),
        None => println!("⚠️  The client has no timeout. Press Ctrl+C to cancel."),
    }
    println!("{}", r.separator(60));

    let start = Instant::now();
    let outcome = client.timeout_probe(minutes, client_timeout).await;
    let elapsed = start.elapsed();
    let secs = elapsed.as_secs_f64();

    println!();
    match outcome {
        Ok(result) => {
            println!("{}", r.success("SUCCESS! Server handled the long request!"));
            println!("{}", r.separator(60));
            println!("📊 Server Response: {}", result);
            println!("⏱️  Actual duration: {:.1} seconds ({:.1} minutes)", secs, secs / 60.0);
            println!(
                "🎯 Expected duration: {} seconds ({} minutes)",
                minutes * 60.0,
                minutes
            );
            println!("📈 Accuracy: {:.1}%", accuracy_percent(elapsed, minutes));
            true
        }
        Err(e) => {
            println!("{}", r.error("FAILED!"));
            println!("{}", r.separator(60));
            println!(
                "💥 Error after {:.1} seconds ({:.1} minutes): {}",
                secs,
                secs / 60.0,
                e
            );
            let [headline, detail] = FailureAnalysis::classify(elapsed).explanation();
            println!("🔍 ANALYSIS: {}", headline);
            println!("   {}", detail);
            false
        }
    }
}
