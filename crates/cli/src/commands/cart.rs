//! Cart commands.

use oshop_core::{ProductId, Quantity};
use oshop_storefront::StorefrontError;

use super::{CliSession, CommandError};

/// Print resolved cart lines, any products that could not be found, and the total.
#[allow(clippy::print_stdout)]
pub async fn show(session: &mut CliSession) -> Result<(), CommandError> {
    if session.cart().is_empty() {
        println!("Cart is empty.");
        return Ok(());
    }

    session.load_products_for_cart().await;

    for line in session.cart_lines() {
        println!(
            "{:>6}  {:<40} x{:<4} {:>12}",
            line.product.id.as_i64(),
            line.product.title,
            line.quantity.get(),
            line.total.display()
        );
    }
    for id in session.unresolved_cart_items() {
        if let Some(item) = session.cart().get(id) {
            println!("{:>6}  {:<40} x{:<4}", id.as_i64(), "(unavailable)", item.quantity.get());
        }
    }
    println!("Total: {}", session.total_price().display());

    let checkout = session.checkout();
    if !checkout.phone_digits().is_empty() {
        println!("Phone: {}", checkout.phone_display());
    }
    Ok(())
}

/// Add a product or overwrite its quantity.
#[allow(clippy::print_stdout)]
pub fn add(session: &mut CliSession, id: ProductId, quantity: &str) -> Result<(), CommandError> {
    let quantity = Quantity::from_input(quantity);
    session.add_to_cart(id, quantity)?;
    println!("Product {id}: {quantity} in cart");
    Ok(())
}

/// Set the quantity of a product already in the cart.
#[allow(clippy::print_stdout)]
pub fn update(session: &mut CliSession, id: ProductId, quantity: &str) -> Result<(), CommandError> {
    let quantity = Quantity::from_input(quantity);
    if !session.update_cart_item(id, quantity)? {
        return Err(StorefrontError::NotInCart(id).into());
    }
    println!("Product {id}: {quantity} in cart");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn increment(session: &mut CliSession, id: ProductId) -> Result<(), CommandError> {
    let quantity = session.increment(id)?.ok_or(StorefrontError::NotInCart(id))?;
    println!("Product {id}: {quantity} in cart");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn decrement(session: &mut CliSession, id: ProductId) -> Result<(), CommandError> {
    let quantity = session.decrement(id)?.ok_or(StorefrontError::NotInCart(id))?;
    println!("Product {id}: {quantity} in cart");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn clear(session: &mut CliSession) -> Result<(), CommandError> {
    session.clear_cart().await?;
    println!("Cart cleared.");
    Ok(())
}
