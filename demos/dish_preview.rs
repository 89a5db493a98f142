//! Desktop walkthrough of the AR session flow.
//!
//! Runs the full engine against the synthetic camera: pick a dish below,
//! press Start AR (or Space), point the fake camera at the fake placemat,
//! and drag to rotate. `RUST_LOG=garnish=debug` shows the state machine.
//!
//!     cargo run --example dish_preview [dish-id]

use garnish::prelude::*;

const MOCK_MENU: &str = r#"{
    "items": [
        {
            "id": 1,
            "name": "Margherita Pizza",
            "description": "Tomato, mozzarella and basil",
            "price": 15.99,
            "category": "Pizza",
            "asset_ref": ""
        },
        {
            "id": 2,
            "name": "Smash Burger",
            "description": "Double patty, cheddar, pickles",
            "price": 12.49,
            "category": "Burgers",
            "asset_ref": ""
        },
        {
            "id": 3,
            "name": "Garden Salad",
            "description": "Greens, cherry tomatoes, vinaigrette",
            "price": 9.5,
            "category": "Salads",
            "asset_ref": ""
        },
        {
            "id": 4,
            "name": "Adana Kebab",
            "description": "Char-grilled skewer with peppers",
            "price": 14.0,
            "category": "Grill",
            "asset_ref": ""
        },
        {
            "id": 5,
            "name": "Chef's Surprise",
            "description": "Ask your waiter",
            "price": 21.0,
            "category": "Specials",
            "asset_ref": ""
        }
    ]
}"#;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let catalog = MenuCatalog::from_json(MOCK_MENU)?;
    let id: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);

    let item = catalog
        .find(id)
        .unwrap_or_else(|| &catalog.items[0])
        .clone();
    println!("Previewing: {} ({:.2})", item.name, item.price);

    let mut app = garnish::default();
    app.set_item(item);
    app.run();
    Ok(())
}
