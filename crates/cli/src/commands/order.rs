//! Phone entry and order submission.

use oshop_core::validate_phone;
use oshop_storefront::checkout::SubmitOutcome;

use super::{CliSession, CommandError};

/// Save the phone input and report whether it is valid.
///
/// An invalid number is still saved, as a partially typed field would be.
#[allow(clippy::print_stdout)]
pub fn phone(session: &mut CliSession, raw: &str) -> Result<(), CommandError> {
    session.set_phone(raw)?;

    let checkout = session.checkout();
    match validate_phone(checkout.phone_digits()) {
        Ok(()) => println!("{} (valid)", checkout.phone_display()),
        Err(e) => println!("{} ({e})", checkout.phone_display()),
    }
    Ok(())
}

/// Submit the saved cart.
#[allow(clippy::print_stdout)]
pub async fn submit(session: &mut CliSession, phone: Option<&str>) -> Result<(), CommandError> {
    if let Some(raw) = phone {
        session.set_phone(raw)?;
    }

    match session.submit_order().await? {
        SubmitOutcome::Placed => {
            println!("Order placed. Thank you!");
            Ok(())
        }
        SubmitOutcome::InvalidPhone(e) => Err(e.into()),
        SubmitOutcome::EmptyCart => Err(CommandError::EmptyCart),
        SubmitOutcome::Busy => Err(CommandError::OrderFailed(
            "another order is being submitted".to_string(),
        )),
        SubmitOutcome::Failed { message } => Err(CommandError::OrderFailed(message)),
    }
}
