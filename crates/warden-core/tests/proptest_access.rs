//! Property-based tests for access evaluation and renewal
//!
//! - A live subscription always wins, whatever the trial flag says
//! - Without one, a fresh user gets the trial and a used trial is denied
//! - Ungated services are always open
//! - A first renewal extends by exactly one term from the sweep time

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use warden_core::{evaluate_access, renew, GatingPolicy, RenewalBasis};
use warden_types::{
    AccessDecision, PaymentMethod, ServiceType, Subscription, SubscriptionId, TrialFlags, User,
    UserId,
};

// ============================================================================
// Strategies
// ============================================================================

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn arb_term() -> impl Strategy<Value = i64> {
    prop_oneof![Just(30i64), Just(90i64), Just(365i64)]
}

fn arb_service() -> impl Strategy<Value = ServiceType> {
    prop_oneof![
        Just(ServiceType::Geolocation),
        Just(ServiceType::LinkChecker),
        Just(ServiceType::FileChecker),
    ]
}

fn user(trial_used: bool) -> User {
    User {
        id: UserId(1),
        username: "prop".into(),
        email: "prop@example.com".into(),
        is_active: true,
        trials: TrialFlags {
            geolocation: trial_used,
            link_checker: trial_used,
            file_checker: trial_used,
        },
        created_at: base(),
    }
}

fn subscription(purchase_offset_mins: i64, duration_days: i64, auto_renew: bool) -> Subscription {
    let purchase_date = base() + Duration::minutes(purchase_offset_mins);
    Subscription {
        id: SubscriptionId(1),
        user_id: UserId(1),
        service_type: ServiceType::Geolocation,
        payment_method: PaymentMethod::Gcash,
        payment_reference: "REF000001".into(),
        amount_cents: 9_900,
        purchase_date,
        expiry_date: purchase_date + Duration::days(duration_days),
        duration_days,
        is_active: true,
        auto_renew,
        renewal_contact: None,
        last_renewal_date: None,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn live_subscription_always_grants(
        trial_used in any::<bool>(),
        duration in arb_term(),
        elapsed_mins in 0i64..(30 * 24 * 60 - 1),
    ) {
        let sub = subscription(0, duration, false);
        let now = base() + Duration::minutes(elapsed_mins);
        let decision = evaluate_access(
            &user(trial_used), &[sub], ServiceType::Geolocation, now, &GatingPolicy::default(),
        );
        prop_assert_eq!(decision, AccessDecision::SUBSCRIPTION);
    }

    #[test]
    fn expired_subscription_never_grants(
        duration in arb_term(),
        late_mins in 0i64..(400 * 24 * 60),
    ) {
        let sub = subscription(0, duration, true);
        let now = sub.expiry_date + Duration::minutes(late_mins);
        let decision = evaluate_access(
            &user(true), &[sub], ServiceType::Geolocation, now, &GatingPolicy::default(),
        );
        prop_assert_eq!(decision, AccessDecision::DENIED);
    }

    #[test]
    fn trial_flag_decides_without_subscription(trial_used in any::<bool>()) {
        let decision = evaluate_access(
            &user(trial_used), &[], ServiceType::Geolocation, base(), &GatingPolicy::default(),
        );
        let expected = if trial_used { AccessDecision::DENIED } else { AccessDecision::TRIAL };
        prop_assert_eq!(decision, expected);
    }

    #[test]
    fn open_policy_is_always_open(service in arb_service(), trial_used in any::<bool>()) {
        let decision = evaluate_access(
            &user(trial_used), &[], service, base(), &GatingPolicy::open(),
        );
        prop_assert_eq!(decision, AccessDecision::OPEN);
    }

    #[test]
    fn renewal_extends_by_one_term(
        duration in arb_term(),
        offset_mins in 0i64..100_000,
        late_mins in -(24 * 60i64)..(60 * 24 * 60),
        fixed in any::<bool>(),
    ) {
        let sub = subscription(offset_mins, duration, true);
        let now = sub.expiry_date + Duration::minutes(late_mins);
        let basis = if fixed { RenewalBasis::FixedTerm } else { RenewalBasis::PurchaseSpan };

        let renewal = renew(&sub, now, basis).unwrap();
        prop_assert!(renewal.new_expiry > now);
        prop_assert_eq!(renewal.renewed_at, now);
        prop_assert_eq!(renewal.new_expiry - now, Duration::days(duration));
    }

    #[test]
    fn renewal_without_auto_renew_is_none(duration in arb_term(), fixed in any::<bool>()) {
        let sub = subscription(0, duration, false);
        let basis = if fixed { RenewalBasis::FixedTerm } else { RenewalBasis::PurchaseSpan };
        prop_assert!(renew(&sub, sub.expiry_date, basis).is_none());
    }
}
