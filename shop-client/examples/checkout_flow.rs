// shop-client/examples/checkout_flow.rs
// Login, browse, fill the cart and place a cash-on-delivery order

use shared::models::{PaymentMethod, ShippingAddress};
use shop_client::{CheckoutForm, ClientConfig, Connectivity, PageRequest, ShopContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shop_client=debug")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <email> <password>", args[0]);
        println!("  Example: {} mai@example.com secret123", args[0]);
        return Ok(());
    }

    let ctx = ShopContext::open(ClientConfig::from_env(), Connectivity::default()).await?;

    let user = match ctx.auth().login(&args[1], &args[2]).await {
        Ok(user) => user,
        Err(e) => {
            ctx.errors().handle(&e.clone().into(), "login");
            return Err(e.into());
        }
    };
    tracing::info!("Logged in as: {} <{}>", user.name, user.email);

    let page = ctx.products().list(PageRequest::default()).await?;
    tracing::info!("{} products, showing {}", page.total, page.items.len());

    // first product with stock in any variant
    let Some((product, entry)) = page.items.iter().find_map(|p| {
        p.inventory
            .iter()
            .find(|e| e.quantity > 0)
            .map(|e| (p.clone(), e.clone()))
    }) else {
        tracing::warn!("Nothing in stock");
        return Ok(());
    };

    {
        let mut cart = ctx.cart().lock().await;
        cart.add_item(product, &entry.size_id, &entry.color_id, 1).await;
        let totals = cart.totals();
        tracing::info!(
            subtotal = totals.subtotal,
            tax = totals.tax,
            shipping = totals.shipping,
            total = totals.total,
            "Cart ready"
        );
    }

    let form = CheckoutForm::new(
        ShippingAddress {
            street: "12 Le Loi".into(),
            city: "Ho Chi Minh City".into(),
            state: "District 1".into(),
            zip: "700000".into(),
            country: "VN".into(),
        },
        PaymentMethod::CashOnDelivery,
    );

    match ctx.checkout(&form).await {
        Ok(order) => {
            tracing::info!("Order {} placed, status {:?}", order.id, order.status);
            let tracking = ctx.orders().track(&order.id).await?;
            tracing::info!("Timeline has {} events", tracking.timeline.len());
        }
        Err(e) => {
            let report = ctx.errors().handle(&e.into(), "checkout");
            if report.should_alert() {
                tracing::error!("Checkout failed: {}", report.message);
            }
        }
    }

    Ok(())
}
