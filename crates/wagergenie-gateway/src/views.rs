// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-rendered HTML views.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Their names end in `.html`, so minijinja autoescapes every value.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use strum::{Display, EnumString};
use wagergenie_core::GenieError;
use wagergenie_core::feed::{DashboardStats, FeedSource};
use wagergenie_core::types::{
    ChatMessage, Pick, PickResult, RiskTolerance, SPORTS, UserPreferences,
};

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../templates/base.html")),
    ("app.html", include_str!("../templates/app.html")),
    ("landing.html", include_str!("../templates/landing.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("chat.html", include_str!("../templates/chat.html")),
    ("settings.html", include_str!("../templates/settings.html")),
    ("genie.html", include_str!("../templates/genie.html")),
];

/// The template environment shared by every page handler.
#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, GenieError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| GenieError::Internal(format!("template {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: &S) -> Result<String, GenieError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(context))
            .map_err(|e| GenieError::Internal(format!("rendering {name}: {e}")))
    }
}

/// Which form the landing page shows first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Signup,
    Signin,
}

/// Tabs of the `/genie` page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenieTab {
    #[default]
    Picks,
    Chat,
    Packages,
}

#[derive(Debug, Serialize)]
pub struct LandingPage<'a> {
    pub app_name: &'a str,
    pub mode: AuthMode,
    pub email: &'a str,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
}

/// One pick as the templates show it.
#[derive(Debug, Clone, Serialize)]
pub struct PickCard {
    pub id: String,
    pub sport: String,
    pub matchup: String,
    pub prediction: String,
    pub confidence: u8,
    pub result: PickResult,
    pub explanation: String,
    pub date: String,
}

impl From<&Pick> for PickCard {
    fn from(pick: &Pick) -> Self {
        Self {
            id: pick.id.clone(),
            sport: pick.sport.clone(),
            matchup: pick.matchup.clone(),
            prediction: pick.prediction.clone(),
            confidence: pick.confidence,
            result: pick.result,
            explanation: pick.explanation.clone(),
            date: pick.display_date(),
        }
    }
}

pub fn pick_cards(picks: &[Pick]) -> Vec<PickCard> {
    picks.iter().map(PickCard::from).collect()
}

#[derive(Debug, Serialize)]
pub struct DashboardPage<'a> {
    pub app_name: &'a str,
    pub active: &'static str,
    pub stats: DashboardStats,
    pub picks: Vec<PickCard>,
    pub source: FeedSource,
}

#[derive(Debug, Serialize)]
pub struct ChatPage<'a> {
    pub app_name: &'a str,
    pub active: &'static str,
    pub view_id: &'a str,
    pub messages: Vec<ChatMessage>,
    /// Shown when a chat request fails in the browser.
    pub error_reply: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RiskOption {
    pub value: RiskTolerance,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct SportOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct SettingsPage<'a> {
    pub app_name: &'a str,
    pub active: &'static str,
    pub email: &'a str,
    pub preferences: &'a UserPreferences,
    pub risk_options: Vec<RiskOption>,
    pub sports: Vec<SportOption>,
}

impl<'a> SettingsPage<'a> {
    pub fn new(app_name: &'a str, email: &'a str, preferences: &'a UserPreferences) -> Self {
        let risk_options = RiskTolerance::ALL
            .into_iter()
            .map(|value| RiskOption {
                value,
                label: value.label(),
                selected: value == preferences.risk_tolerance,
            })
            .collect();
        let sports = SPORTS
            .into_iter()
            .map(|name| SportOption {
                name,
                selected: preferences.favorite_sports.contains(name),
            })
            .collect();
        Self {
            app_name,
            active: "settings",
            email,
            preferences,
            risk_options,
            sports,
        }
    }
}

/// A subscription tier on the packages tab. Display only.
#[derive(Debug, Serialize)]
pub struct Package {
    pub name: &'static str,
    pub price: u32,
    pub popular: bool,
    pub features: &'static [&'static str],
}

pub static PACKAGES: [Package; 3] = [
    Package {
        name: "Basic Wish \u{1F31F}",
        price: 29,
        popular: false,
        features: &["Daily Top Pick", "Basic Analytics", "Community Chat"],
    },
    Package {
        name: "Premium Wishes \u{2B50}\u{FE0F}",
        price: 79,
        popular: true,
        features: &[
            "All Basic Features",
            "5 Daily Premium Picks",
            "Advanced Analytics",
            "Priority Support",
        ],
    },
    Package {
        name: "Infinite Wishes \u{1F308}",
        price: 199,
        popular: false,
        features: &[
            "All Premium Features",
            "Unlimited Picks",
            "1-on-1 Consulting",
            "VIP Community Access",
        ],
    },
];

#[derive(Debug, Serialize)]
pub struct GeniePage<'a> {
    pub app_name: &'a str,
    pub view_id: &'a str,
    pub tab: GenieTab,
    pub picks: Vec<PickCard>,
    pub messages: Vec<ChatMessage>,
    pub error_reply: &'a str,
    pub packages: &'static [Package],
}
