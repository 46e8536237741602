//! Cart route handlers.
//!
//! The cart page is server-rendered. Add, remove and checkout are small JSON
//! endpoints called from `static/js/storefront.js`; they take either a
//! urlencoded or a JSON body, always answer
//! `{"success": bool, "message": string}` and never redirect.

use std::convert::Infallible;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use aoeyaeng_core::{CartItemId, ProductId};

use crate::db::CartRepository;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CartLine, CartSummary};
use crate::state::AppState;

const LOGIN_REQUIRED: &str = "Please log in before adding items to the cart.";
const ITEM_ADDED: &str = "Item added to cart.";
const ADD_FAILED: &str = "Failed to add item to cart.";
const ITEM_REMOVED: &str = "Item removed from cart.";
const REMOVE_FAILED: &str = "Failed to remove item.";
const ORDER_CONFIRMED: &str = "Order confirmed! Thank you for your purchase.";
const CHECKOUT_FAILED: &str = "An error occurred during checkout.";
const UNAUTHORIZED: &str = "Unauthorized";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub cart_item_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            cart_item_id: line.cart_item_id.to_string(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            price: line.price.to_string(),
            quantity: line.quantity,
            line_total: line.line_total().to_string(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub is_logged_in: bool,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

/// An id sent as a form string or a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Number(i64),
    Text(String),
}

impl IdField {
    fn parse<T: FromStr>(&self) -> Option<T> {
        match self {
            Self::Number(n) => n.to_string().parse().ok(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddToCartForm {
    pub product_id: Option<IdField>,
}

/// Remove from cart request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoveFromCartForm {
    pub cart_id: Option<IdField>,
}

/// Body of a cart action, read as JSON when the request says so and as a
/// urlencoded form otherwise.
///
/// Never rejects: an unreadable body yields `T::default()`, which the
/// handlers answer with their JSON failure message.
pub struct CartBody<T>(pub T);

impl<S, T> FromRequest<S> for CartBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        let parsed = if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.body_text())
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.body_text())
        };

        Ok(Self(parsed.unwrap_or_else(|reason| {
            tracing::warn!(%reason, "Unreadable cart request body");
            T::default()
        })))
    }
}

/// JSON reply of the cart endpoints.
#[derive(Debug, Serialize)]
pub struct CartActionResponse {
    pub success: bool,
    pub message: &'static str,
}

impl CartActionResponse {
    const fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }

    const fn fail(message: &'static str) -> Json<Self> {
        Json(Self {
            success: false,
            message,
        })
    }
}

/// Display the member's cart.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(member): RequireAuth,
) -> Result<impl IntoResponse> {
    let lines = CartRepository::new(state.pool())
        .lines_for_member(member.id)
        .await?;
    let summary = CartSummary::from_lines(lines);

    Ok(CartTemplate {
        is_logged_in: true,
        lines: summary.lines.iter().map(CartLineView::from).collect(),
        total: summary.total.to_string(),
        item_count: summary.item_count,
    })
}

/// Add one unit of a product to the cart.
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(member): OptionalAuth,
    CartBody(form): CartBody<AddToCartForm>,
) -> Json<CartActionResponse> {
    let Some(member) = member else {
        return CartActionResponse::fail(LOGIN_REQUIRED);
    };

    let Some(product_id) = form.product_id.as_ref().and_then(IdField::parse::<ProductId>)
    else {
        tracing::warn!(product_id = ?form.product_id, "Add to cart with invalid product id");
        return CartActionResponse::fail(ADD_FAILED);
    };

    match CartRepository::new(state.pool())
        .add_item(member.id, product_id, 1)
        .await
    {
        Ok(()) => {
            let product = product_id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_id", product.as_str())]));
            CartActionResponse::ok(ITEM_ADDED)
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = %product_id, "Add to cart failed");
            CartActionResponse::fail(ADD_FAILED)
        }
    }
}

/// Remove one of the member's cart lines.
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(member): OptionalAuth,
    CartBody(form): CartBody<RemoveFromCartForm>,
) -> Json<CartActionResponse> {
    let Some(member) = member else {
        return CartActionResponse::fail(UNAUTHORIZED);
    };

    let Some(cart_item_id) = form.cart_id.as_ref().and_then(IdField::parse::<CartItemId>)
    else {
        return CartActionResponse::fail(REMOVE_FAILED);
    };

    match CartRepository::new(state.pool())
        .remove_item(cart_item_id, member.id)
        .await
    {
        Ok(true) => CartActionResponse::ok(ITEM_REMOVED),
        Ok(false) => {
            tracing::warn!(cart_item_id = %cart_item_id, "Remove for a line the member doesn't own");
            CartActionResponse::fail(REMOVE_FAILED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Remove from cart failed");
            CartActionResponse::fail(REMOVE_FAILED)
        }
    }
}

/// Confirm the order by emptying the member's cart.
pub async fn checkout(
    State(state): State<AppState>,
    OptionalAuth(member): OptionalAuth,
) -> Json<CartActionResponse> {
    let Some(member) = member else {
        return CartActionResponse::fail(UNAUTHORIZED);
    };

    match CartRepository::new(state.pool()).clear(member.id).await {
        Ok(lines) => {
            tracing::info!(member_id = %member.id, lines, "Checkout completed");
            CartActionResponse::ok(ORDER_CONFIRMED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Checkout failed");
            CartActionResponse::fail(CHECKOUT_FAILED)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_action_response_shape() {
        let Json(body) = CartActionResponse::ok(ITEM_ADDED);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "message": "Item added to cart." })
        );

        let Json(body) = CartActionResponse::fail(UNAUTHORIZED);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized");
    }

    #[test]
    fn test_id_field_accepts_numbers_and_strings() {
        let json: RemoveFromCartForm = serde_json::from_str(r#"{"cart_id": 7}"#).unwrap();
        assert_eq!(json.cart_id.unwrap().parse::<CartItemId>(), Some(CartItemId::new(7)));

        let json: RemoveFromCartForm = serde_json::from_str(r#"{"cart_id": "7"}"#).unwrap();
        assert_eq!(json.cart_id.unwrap().parse::<CartItemId>(), Some(CartItemId::new(7)));

        let json: AddToCartForm = serde_json::from_str(r#"{"product_id": "tee"}"#).unwrap();
        assert_eq!(json.product_id.unwrap().parse::<ProductId>(), None);

        let empty: AddToCartForm = serde_json::from_str("{}").unwrap();
        assert!(empty.product_id.is_none());
    }
}
