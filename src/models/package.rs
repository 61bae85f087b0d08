use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Purchasable package kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Vip,
    Ad,
}

impl FromStr for PackageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip" => Ok(PackageKind::Vip),
            "ad" => Ok(PackageKind::Ad),
            _ => Err(()),
        }
    }
}

/// Duration tier for ad packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdTier {
    Week,
    Month,
}

impl FromStr for AdTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(AdTier::Week),
            "month" => Ok(AdTier::Month),
            _ => Err(()),
        }
    }
}

/// The concrete benefit a store receives once its order is confirmed paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    VipLifetime,
    AdWeek,
    AdMonth,
}

impl Entitlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entitlement::VipLifetime => "vip_lifetime",
            Entitlement::AdWeek => "ad_week",
            Entitlement::AdMonth => "ad_month",
        }
    }

    /// Ad tier name and placement duration in days; `None` for VIP.
    pub fn ad_terms(&self) -> Option<(&'static str, i64)> {
        match self {
            Entitlement::VipLifetime => None,
            Entitlement::AdWeek => Some(("week", 7)),
            Entitlement::AdMonth => Some(("month", 30)),
        }
    }
}

impl FromStr for Entitlement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip_lifetime" => Ok(Entitlement::VipLifetime),
            "ad_week" => Ok(Entitlement::AdWeek),
            "ad_month" => Ok(Entitlement::AdMonth),
            _ => Err(()),
        }
    }
}
