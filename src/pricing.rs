//! Static pricing table for purchasable packages.
//!
//! Pricing is a pure function of the request so checkout amounts stay
//! auditable and testable without a live gateway.

use crate::error::{msg, AppError, Result};
use crate::models::{AdTier, Entitlement, PackageKind};

/// A package request resolved against the pricing table.
/// Amounts are in VND (the gateway's minor unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedPackage {
    pub amount: i64,
    pub description: &'static str,
    pub entitlement: Entitlement,
}

const VIP_PACKAGE: PricedPackage = PricedPackage {
    amount: 100_000,
    description: "VIP store upgrade",
    entitlement: Entitlement::VipLifetime,
};

const AD_WEEK_PACKAGE: PricedPackage = PricedPackage {
    amount: 50_000,
    description: "Store ads (1 week)",
    entitlement: Entitlement::AdWeek,
};

const AD_MONTH_PACKAGE: PricedPackage = PricedPackage {
    amount: 150_000,
    description: "Store ads (1 month)",
    entitlement: Entitlement::AdMonth,
};

/// Price a package request. An ad purchase without a tier defaults to the
/// weekly package; anything outside the enumerated domain is rejected.
pub fn price_package(kind: &str, ad_tier: Option<&str>) -> Result<PricedPackage> {
    let kind: PackageKind = kind
        .parse()
        .map_err(|_| AppError::InvalidPackage(format!("{}: {}", msg::UNKNOWN_PACKAGE_KIND, kind)))?;

    match kind {
        PackageKind::Vip => Ok(VIP_PACKAGE),
        PackageKind::Ad => {
            let tier = match ad_tier {
                None => AdTier::Week,
                Some(t) => t.parse().map_err(|_| {
                    AppError::InvalidPackage(format!("{}: {}", msg::UNKNOWN_AD_TIER, t))
                })?,
            };
            match tier {
                AdTier::Week => Ok(AD_WEEK_PACKAGE),
                AdTier::Month => Ok(AD_MONTH_PACKAGE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vip_package_price() {
        let priced = price_package("vip", None).unwrap();
        assert_eq!(priced.amount, 100_000);
        assert_eq!(priced.entitlement, Entitlement::VipLifetime);
    }

    #[test]
    fn vip_ignores_ad_tier() {
        let priced = price_package("vip", Some("month")).unwrap();
        assert_eq!(priced.entitlement, Entitlement::VipLifetime);
        assert_eq!(priced.amount, 100_000);
    }

    #[test]
    fn ad_month_package_price() {
        let priced = price_package("ad", Some("month")).unwrap();
        assert_eq!(priced.amount, 150_000);
        assert_eq!(priced.entitlement, Entitlement::AdMonth);
    }

    #[test]
    fn ad_week_package_price() {
        let priced = price_package("ad", Some("week")).unwrap();
        assert_eq!(priced.amount, 50_000);
        assert_eq!(priced.entitlement, Entitlement::AdWeek);
    }

    #[test]
    fn ad_defaults_to_week() {
        let priced = price_package("ad", None).unwrap();
        assert_eq!(priced.amount, 50_000);
        assert_eq!(priced.entitlement, Entitlement::AdWeek);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = price_package("gold", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidPackage(_)));
    }

    #[test]
    fn unknown_ad_tier_is_rejected() {
        let err = price_package("ad", Some("year")).unwrap_err();
        assert!(matches!(err, AppError::InvalidPackage(_)));
    }
}
