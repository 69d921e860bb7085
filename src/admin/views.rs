//! Per-entity view declarations driving the admin tables and forms.
//!
//! Columns are declared statically instead of being introspected from the
//! first returned record, so an empty or heterogeneous list renders the
//! same table shape every time.

use crate::registry::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// Fixed enum options rendered as a dropdown.
    Select(&'static [&'static str]),
    /// Single referenced entity, edited via a dropdown over its full list.
    Reference(&'static str),
    /// Array of referenced entities, edited via a multi-select.
    ReferenceList(&'static str),
    /// Raw JSON textarea, used for embedded line arrays.
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub in_form: bool,
}

impl Field {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            in_form: true,
        }
    }

    pub const fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number,
            in_form: true,
        }
    }

    pub const fn date(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Date,
            in_form: true,
        }
    }

    pub const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select(options),
            in_form: true,
        }
    }

    pub const fn reference(name: &'static str, label: &'static str, target: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Reference(target),
            in_form: true,
        }
    }

    pub const fn reference_list(
        name: &'static str,
        label: &'static str,
        target: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::ReferenceList(target),
            in_form: true,
        }
    }

    pub const fn json(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Json,
            in_form: true,
        }
    }

    /// Shown in the table but left out of the create/edit form.
    pub const fn readonly(mut self) -> Self {
        self.in_form = false;
        self
    }
}

#[derive(Debug)]
pub struct EntityView {
    pub token: &'static str,
    pub title: &'static str,
    pub model: Model,
    pub fields: &'static [Field],
}

pub static VIEWS: &[EntityView] = &[
    EntityView {
        token: "user",
        title: "Users",
        model: Model::User,
        fields: &[
            Field::text("username", "Username"),
            Field::text("email", "Email"),
            Field::text("password", "Password"),
            Field::select("role", "Role", &["customer", "admin"]),
            Field::text("address.street", "Street"),
            Field::text("address.city", "City"),
            Field::text("address.postalCode", "Postal code"),
            Field::text("address.country", "Country"),
            Field::date("createdAt", "Created").readonly(),
        ],
    },
    EntityView {
        token: "category",
        title: "Categories",
        model: Model::Category,
        fields: &[
            Field::text("name", "Name"),
            Field::text("description", "Description"),
        ],
    },
    EntityView {
        token: "product",
        title: "Products",
        model: Model::Product,
        fields: &[
            Field::text("name", "Name"),
            Field::text("description", "Description"),
            Field::number("price", "Price"),
            Field::reference("category", "Category", "category"),
            Field::number("stock", "Stock"),
            Field::date("createdAt", "Created").readonly(),
        ],
    },
    EntityView {
        token: "order",
        title: "Orders",
        model: Model::Order,
        fields: &[
            Field::reference("user", "User", "user"),
            Field::json("products", "Products"),
            Field::number("totalAmount", "Total"),
            Field::select("paymentStatus", "Payment status", &["pending", "paid", "failed"]),
            Field::select(
                "deliveryStatus",
                "Delivery status",
                &["processing", "shipped", "delivered"],
            ),
            Field::date("orderedAt", "Ordered").readonly(),
        ],
    },
    EntityView {
        token: "review",
        title: "Reviews",
        model: Model::Review,
        fields: &[
            Field::reference("product", "Product", "product"),
            Field::reference("user", "User", "user"),
            Field::number("rating", "Rating"),
            Field::text("comment", "Comment"),
            Field::date("createdAt", "Created").readonly(),
        ],
    },
    EntityView {
        token: "wishlist",
        title: "Wishlists",
        model: Model::Wishlist,
        fields: &[
            Field::reference("user", "User", "user"),
            Field::reference_list("products", "Products", "product"),
        ],
    },
    EntityView {
        token: "payment",
        title: "Payments",
        model: Model::Payment,
        fields: &[
            Field::reference("order", "Order", "order"),
            Field::reference("user", "User", "user"),
            Field::number("amount", "Amount"),
            Field::select(
                "paymentMethod",
                "Method",
                &["card", "paypal", "bank", "crypto"],
            ),
            Field::select(
                "paymentStatus",
                "Status",
                &["pending", "completed", "failed"],
            ),
            Field::text("transactionId", "Transaction id"),
            Field::date("paidAt", "Paid at"),
        ],
    },
];

impl EntityView {
    pub fn resolve(token: &str) -> Option<&'static EntityView> {
        VIEWS.iter().find(|view| view.token.eq_ignore_ascii_case(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_view_token_resolves_to_an_admin_model() {
        for view in VIEWS {
            assert_eq!(
                Model::resolve_admin(view.token),
                Some(view.model),
                "view {} maps to the wrong model",
                view.token
            );
        }
    }

    #[test]
    fn reference_targets_are_declared_views() {
        for view in VIEWS {
            for field in view.fields {
                if let FieldKind::Reference(target) | FieldKind::ReferenceList(target) = field.kind
                {
                    assert!(
                        EntityView::resolve(target).is_some(),
                        "{}.{} references unknown view {}",
                        view.token,
                        field.name,
                        target
                    );
                }
            }
        }
    }
}
