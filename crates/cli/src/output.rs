//! Terminal output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use barely_used_core::{Order, Product, RatingSummary, Review, format_amount};
use barely_used_storefront::AppError;
use barely_used_storefront::search::Suggestions;
use barely_used_storefront::stores::{CartStore, WishlistStore};
use rust_decimal::Decimal;

pub fn message(text: &str) {
    println!("{text}");
}

pub fn heading(text: &str) {
    println!("{text}");
    println!("{}", "=".repeat(text.chars().count()));
}

pub fn lines<I: IntoIterator<Item = String>>(lines: I) {
    for line in lines {
        println!("{line}");
    }
}

fn product_line(product: &Product) -> String {
    format!(
        "{:<24} {:<40} {:>14}  {:<10} {}",
        product.product_id,
        product.name,
        product.display_price(),
        product.condition,
        product.category
    )
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        println!("{}", product_line(product));
    }
    println!("\n{} product(s)", products.len());
}

pub fn product_detail(product: &Product, reviews: &[Review]) {
    heading(&product.name);
    let negotiable = if product.negotiable { " (negotiable)" } else { "" };
    println!("Price:       {}{negotiable}", product.display_price());
    println!("Category:    {} / {}", product.category, product.subcategory);
    println!("Condition:   {}", product.condition);
    println!("Years used:  {}", product.years_used);
    println!("Seller:      {}", product.seller_name);
    println!("Location:    {}, {}", product.location.city, product.location.country);
    println!("Shipping:    {}", product.shipping_options.join(", "));
    println!("Status:      {}", product.status);
    println!("Views:       {}", product.views);
    if let Some(posted) = product.posted_at {
        println!("Posted:      {}", posted.format("%Y-%m-%d"));
    }
    println!("\n{}", product.description);
    if !product.specifications.trim().is_empty() {
        println!("\nSpecifications:\n{}", product.specifications);
    }
    for image in &product.images {
        println!("Image: {image}");
    }

    let rating = RatingSummary::of(reviews);
    println!(
        "\nRating:      {} / 5 ({} reviews)",
        rating.display_average(),
        rating.count
    );
    for review in reviews {
        println!(
            "  {}{} {}: {}",
            "*".repeat(usize::from(review.rating.min(5))),
            " ".repeat(usize::from(5 - review.rating.min(5))),
            review.reviewer_name,
            review.comment
        );
    }
}

pub fn suggestions(suggestions: &Suggestions) {
    if suggestions.products.is_empty() {
        println!("No products found for \"{}\".", suggestions.query);
        return;
    }
    for product in &suggestions.products {
        println!("{}", product_line(product));
    }
}

pub fn cart(cart: &CartStore) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<24} {:<40} {:>4} x {:>14} = {}",
            item.product.product_id,
            item.product.name,
            item.quantity,
            item.product.display_price(),
            amount_or_overflow(&item.product.currency, item.line_total())
        );
    }
    println!("\nItems: {}", cart.total_items());
    for (currency, total) in cart.currency_totals() {
        println!("Total: {}", amount_or_overflow(&currency, total));
    }
}

fn amount_or_overflow(currency: &str, amount: Option<Decimal>) -> String {
    amount.map_or_else(
        || format!("{currency} (too large to display)"),
        |amount| format_amount(currency, amount),
    )
}

pub fn wishlist(wishlist: &WishlistStore) {
    if wishlist.is_empty() {
        println!("Your wishlist is empty.");
        return;
    }
    for product in wishlist.items() {
        println!("{}", product_line(product));
    }
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders.");
        return;
    }
    for order in orders {
        println!(
            "{:<24} {:<40} x{:<3} {:>14}  {} / {}",
            order.order_id,
            order.product_name,
            order.quantity,
            format_amount(&order.currency, order.total_amount),
            order.order_status,
            order.payment_status
        );
    }
}

pub fn error(err: &AppError) {
    eprintln!("Error: {err}");
    if matches!(err, AppError::Load(load) if load.is_retryable()) {
        eprintln!("Run the command again to retry.");
    }
}
