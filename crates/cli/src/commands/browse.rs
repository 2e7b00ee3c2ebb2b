//! Read-only views: reviews and product pages.

use oshop_storefront::reviews::to_plain_text;

use super::{CliSession, CommandError};

/// Print every review as plain text.
#[allow(clippy::print_stdout)]
pub async fn reviews(session: &mut CliSession) -> Result<(), CommandError> {
    session.load_reviews().await;

    let reviews = session.reviews().items();
    if reviews.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }

    for review in reviews {
        println!("Review #{}", review.id);
        println!("{}", to_plain_text(&review.html));
        println!();
    }
    Ok(())
}

/// Print one page of products, marking those already in the cart.
#[allow(clippy::print_stdout)]
pub async fn products(session: &mut CliSession, page: u32) -> Result<(), CommandError> {
    session.load_products_page(page).await;

    let catalog = session.catalog();
    if catalog.products().is_empty() {
        println!("No products on page {page}.");
        return Ok(());
    }

    for product in catalog.products() {
        let in_cart = session
            .cart()
            .get(product.id)
            .map(|item| format!("  [in cart: {}]", item.quantity))
            .unwrap_or_default();
        println!("{:>6}  {:<40} {:>12}{in_cart}", product.id.as_i64(), product.title, product.price.display());
    }

    if catalog.has_more() {
        println!("\nMore products: oshop products --page {}", page + 1);
    }
    Ok(())
}
