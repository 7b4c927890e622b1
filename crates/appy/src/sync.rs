// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `appy sync` and `appy rankings`.

use appy_config::AppyConfig;
use appy_core::model::RankingSnapshot;
use appy_core::{AppyError, RankingKind, Section};
use appy_store::{AppData, LoadReport};
use serde::Serialize;

use crate::Client;

/// What a sync pulled into the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub user: Option<String>,
    pub coins: i64,
    pub organization: Option<String>,
    pub areas: usize,
    pub tribes: usize,
    pub notifications: usize,
    pub unread_notifications: usize,
    pub news: usize,
    pub challenges: usize,
    pub cosmetics: usize,
    pub battles: usize,
    pub rankings: Vec<RankingKind>,
    pub failed_sections: Vec<Section>,
    pub failed_rankings: Vec<RankingKind>,
}

impl SyncSummary {
    fn new(data: &AppData, report: &LoadReport) -> Self {
        let user = data.user_info.as_ref().and_then(|i| i.user.as_ref());
        Self {
            user: user.map(crate::session::display_name),
            coins: user.map_or(0, |u| u.coins),
            organization: data.organization_info.as_ref().map(|o| o.name.clone()),
            areas: data.disciplines.len(),
            tribes: data.tribes.len(),
            notifications: data.notifications.len(),
            unread_notifications: data.notifications.iter().filter(|n| !n.is_read()).count(),
            news: data.news.len(),
            challenges: data.challenges.len(),
            cosmetics: data.cosmetics.len(),
            battles: data.battles.len(),
            rankings: RankingKind::ALL
                .into_iter()
                .filter(|kind| data.rankings.get(*kind).is_some())
                .collect(),
            failed_sections: report.failed_sections.clone(),
            failed_rankings: report.failed_rankings.clone(),
        }
    }
}

/// Signs-in check shared by the data commands.
async fn require_session(client: &Client) -> Result<(), AppyError> {
    match client.gateway.validate_session().await? {
        Some(user_config) => {
            client.store.set_user_config(user_config);
            Ok(())
        }
        None => Err(AppyError::Unauthorized),
    }
}

pub async fn run_sync(config: &AppyConfig, json: bool) -> Result<(), AppyError> {
    let client = Client::connect(config).await?;
    require_session(&client).await?;

    let report = client.store.load_app_data().await?;
    if let Err(e) = client.store.load_organization_data().await {
        tracing::warn!(error = %e, "organization info unavailable");
    }
    let summary = SyncSummary::new(&client.store.snapshot(), &report);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!(
        "  {} ({} coins)",
        summary.user.as_deref().unwrap_or("unknown user"),
        summary.coins
    );
    if let Some(org) = &summary.organization {
        println!("  {org}");
    }
    println!("  {}", "-".repeat(35));
    println!("    Areas:          {}", summary.areas);
    println!("    Tribes:         {}", summary.tribes);
    println!(
        "    Notifications:  {} ({} unread)",
        summary.notifications, summary.unread_notifications
    );
    println!("    News:           {}", summary.news);
    println!("    Challenges:     {}", summary.challenges);
    println!("    Cosmetics:      {}", summary.cosmetics);
    println!("    Battles:        {}", summary.battles);
    if !summary.failed_sections.is_empty() || !summary.failed_rankings.is_empty() {
        let failed: Vec<String> = summary
            .failed_sections
            .iter()
            .map(ToString::to_string)
            .chain(summary.failed_rankings.iter().map(|k| format!("ranking:{k}")))
            .collect();
        println!("    Failed:         {}", failed.join(", "));
    }
    println!();
}

pub async fn run_rankings(config: &AppyConfig, kind: RankingKind) -> Result<(), AppyError> {
    let client = Client::connect(config).await?;
    require_session(&client).await?;
    let ranking = client.store.refresh_rankings(kind).await?;
    for line in ranking_lines(&ranking) {
        println!("{line}");
    }
    Ok(())
}

fn ranking_lines(ranking: &RankingSnapshot) -> Vec<String> {
    ranking
        .ranking
        .iter()
        .map(|entry| {
            let marker = if entry.me == 1 { ">" } else { " " };
            let name = entry
                .nickname
                .clone()
                .unwrap_or_else(|| format!("user {}", entry.user_id));
            format!("{marker} {:>3}. {name:<20} {:>8}", entry.position, entry.points)
        })
        .collect()
}
