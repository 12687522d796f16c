// src/backend/utils/guards.rs
use crate::error::AcquisitionError;
use crate::log_warn;
use crate::storage::config::get_config;
use candid::Principal;

/// Checks if the canister has enough cycles to pay for collaborator outcalls.
///
/// # Errors
///
/// Returns `AcquisitionError::CycleLow` if the balance is below the configured threshold.
pub fn check_cycles() -> Result<(), AcquisitionError> {
    let balance = ic_cdk::api::canister_balance128();
    check_balance(balance, get_config().min_cycles_threshold)
}

fn check_balance(balance: u128, threshold: u128) -> Result<(), AcquisitionError> {
    if balance < threshold {
        log_warn!(
            "Cycle balance low: {} cycles, threshold: {}",
            balance,
            threshold
        );
        Err(AcquisitionError::CycleLow)
    } else {
        Ok(())
    }
}

/// Checks if `caller` is the configured admin principal.
///
/// # Errors
///
/// Returns `AcquisitionError::NotAuthorized` if no admin is configured or the caller is not it.
pub fn check_admin(caller: Principal) -> Result<(), AcquisitionError> {
    match get_config().admin {
        Some(admin) if admin == caller => Ok(()),
        Some(_) => Err(AcquisitionError::NotAuthorized(
            "Caller is not the configured admin.".to_string(),
        )),
        None => Err(AcquisitionError::NotAuthorized(
            "No admin principal is configured.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InitArgs;
    use crate::storage::config::init_config;

    #[test]
    fn balance_below_threshold_is_rejected() {
        assert_eq!(check_balance(9, 10), Err(AcquisitionError::CycleLow));
        assert_eq!(check_balance(10, 10), Ok(()));
    }

    #[test]
    fn admin_check_follows_config() {
        let admin = Principal::from_slice(&[1; 29]);
        let other = Principal::from_slice(&[2; 29]);
        assert!(matches!(
            check_admin(admin),
            Err(AcquisitionError::NotAuthorized(_))
        ));

        init_config(Some(InitArgs {
            admin: Some(admin),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(check_admin(admin), Ok(()));
        assert!(matches!(
            check_admin(other),
            Err(AcquisitionError::NotAuthorized(_))
        ));
    }
}
