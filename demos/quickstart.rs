//! End-to-end walkthrough: create an agent, place a call, read the results.
//!
//! This example shows how to:
//! - Configure a client from `CALLWHIZ_*` environment variables
//! - Create an agent with a staged conversation
//! - Start a call and poll it until it finishes
//! - Fetch the transcript, recording, remaining credits and plan limits
//!
//! Run with: `CALLWHIZ_API_KEY=cw_test_... CALLWHIZ_SANDBOX=true cargo run --example quickstart -- +14155550100`

use callwhiz::{
    Client, CreateAgentRequest, Error, Language, ModelTier, StartCallRequest, UsagePeriod,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("callwhiz=debug,quickstart=info")
        .init();

    let phone_number = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "+14155550100".to_string());

    let client = Client::from_env()?;
    println!("Using {}", client.base_url());

    println!("=== Create Agent ===");
    let request = CreateAgentRequest::new("Appointment Reminder", ModelTier::Nano, "Calvin", Language::English)
        .accent("American")
        .first_message("Hi! I'm calling from Riverside Dental.")
        .stage("confirm", "Confirm the appointment time with the patient.")
        .stage("wrap_up", "Thank the patient and end the call politely.");
    let agent = client.create_agent(&request).await?;
    println!("Agent {} ({}, {})", agent.id, agent.model, agent.language);
    println!();

    println!("=== Start Call ===");
    let call = client
        .start_call(
            &StartCallRequest::new(&agent.id, &phone_number)
                .context("patient_name", "Jordan")
                .context("appointment", "Tuesday 10:30"),
        )
        .await?;
    println!("Call {} is {}", call.call_id, call.status);

    let mut call = call;
    for _ in 0..30 {
        if call.status.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        call = client.get_call(&call.call_id).await?;
        println!("  status: {}", call.status);
    }
    println!();

    if call.transcript_available {
        println!("=== Transcript ===");
        let transcript = client.get_call_transcript(&call.call_id).await?;
        println!("{}", transcript.to_plain_text());
        println!();
    }

    if call.recording_available {
        let recording = client.get_call_recording(&call.call_id).await?;
        println!("Recording: {}", recording.recording_url);
    }

    println!("=== Account ===");
    let credits = client.get_credits_detailed().await?;
    println!(
        "{:.2} of {:.2} credits left ({:.1}% used)",
        credits.credits_remaining, credits.total_credits, credits.usage_percentage
    );

    let usage = client.get_usage(UsagePeriod::Week).await?;
    if let Some(total) = usage.counter("voice_calls", "total") {
        println!("Voice calls this week: {}", total);
    }

    let limits = client.get_account_limits().await?;
    if let Some(left) = limits.remaining("agents") {
        println!("Plan {} allows {} more agents", limits.plan, left);
    }

    for number in client.get_user_phone_numbers().await? {
        println!("Number {} ({})", number.phone_number, number.id);
    }

    client.delete_agent(&agent.id).await?;
    client.close();

    Ok(())
}
