//! A small deterministic demo world.
//!
//! Stable ids so scenario tests and demo curls can reference entities
//! without threading values around.  Prices are chosen so the standard
//! cart lands below the fee-waiver threshold and a three-curry cart lands
//! above it.

use std::sync::Arc;

use uuid::Uuid;

use tfn_ledger::OrderLedger;
use tfn_pricing::PricingPolicy;
use tfn_schemas::{
    Address, Caller, CartLine, Cents, CreateOrderRequest, MenuItem, MenuItemOption, Restaurant,
    Role,
};

use crate::{InMemoryDirectory, InMemoryOrderStore};

pub struct DemoWorld {
    pub directory: Arc<InMemoryDirectory>,
    pub store: Arc<InMemoryOrderStore>,
    /// Signed-in customer who owns `address_id`.
    pub customer: Caller,
    /// Owner of `restaurant_id`.
    pub owner: Caller,
    /// Some other authenticated user with no stake in anything.
    pub stranger: Caller,
    pub restaurant_id: Uuid,
    pub address_id: Uuid,
    /// "Paneer Makhani", $12.00.
    pub curry_id: Uuid,
    /// "Garlic Naan", $4.50, offers `extra_cheese_id` (+$1.00).
    pub naan_id: Uuid,
    pub extra_cheese_id: Uuid,
}

impl DemoWorld {
    /// An `OrderLedger` wired to this world with the default policy.
    pub fn ledger(&self) -> OrderLedger {
        self.ledger_with_policy(PricingPolicy::default())
    }

    pub fn ledger_with_policy(&self, policy: PricingPolicy) -> OrderLedger {
        OrderLedger::new(
            self.directory.clone(),
            self.directory.clone(),
            self.directory.clone(),
            self.store.clone(),
            policy,
        )
    }

    /// A valid everyday cart: 2x curry + 1x naan with extra cheese.
    /// Subtotal $29.50, below the waiver threshold.
    pub fn cart(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            restaurant_id: self.restaurant_id,
            items: vec![
                CartLine {
                    menu_item_id: self.curry_id,
                    quantity: 2,
                    customizations: vec![],
                    special_instructions: None,
                },
                CartLine {
                    menu_item_id: self.naan_id,
                    quantity: 1,
                    customizations: vec![self.extra_cheese_id],
                    special_instructions: Some("extra crispy".to_string()),
                },
            ],
            delivery_address_id: self.address_id,
            payment_method: "card".to_string(),
            payment_details: serde_json::json!({"last4": "4242"}),
            special_instructions: None,
            tip: Cents::new(300),
        }
    }
}

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn demo_world() -> DemoWorld {
    let customer = Caller::new(id(0xA001), Role::Customer);
    let owner = Caller::new(id(0xA002), Role::RestaurantOwner);
    let stranger = Caller::new(id(0xA003), Role::Customer);

    let restaurant_id = id(0xB001);
    let address_id = id(0xC001);
    let curry_id = id(0xD001);
    let naan_id = id(0xD002);
    let extra_cheese_id = id(0xE001);

    let directory = Arc::new(InMemoryDirectory::new());
    directory.put_restaurant(Restaurant {
        id: restaurant_id,
        owner_id: owner.user_id,
        name: "Tandoor House".to_string(),
        is_active: true,
        delivery_fee: Cents::new(299),
    });
    directory.put_menu_item(MenuItem {
        id: curry_id,
        restaurant_id,
        name: "Paneer Makhani".to_string(),
        price: Cents::new(1_200),
        is_available: true,
        options: vec![],
    });
    directory.put_menu_item(MenuItem {
        id: naan_id,
        restaurant_id,
        name: "Garlic Naan".to_string(),
        price: Cents::new(450),
        is_available: true,
        options: vec![MenuItemOption {
            id: extra_cheese_id,
            name: "Extra Cheese".to_string(),
            price_delta: Cents::new(100),
        }],
    });
    directory.put_address(Address {
        id: address_id,
        user_id: customer.user_id,
        label: "Home".to_string(),
    });

    DemoWorld {
        directory,
        store: Arc::new(InMemoryOrderStore::new()),
        customer,
        owner,
        stranger,
        restaurant_id,
        address_id,
        curry_id,
        naan_id,
        extra_cheese_id,
    }
}
