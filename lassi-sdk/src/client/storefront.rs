//! Storefront API client (customer frontend → Lassi Corner server).

use reqwest::{Client, RequestBuilder};
use url::Url;

use super::ClientError;
use crate::objects::{
    CartAddRequest, CartDetail, CartRemoveRequest, CartResponse, FoodItem, MessageResponse,
    OrderListResponse, OrderView, PlaceOrderRequest, PlaceOrderResponse, ProfileResponse,
    RelayStatus, SignInRequest, SignInResponse, SignUpRequest, UpdateProfileRequest,
};

/// Typed HTTP client for the storefront REST API.
///
/// Call [`sign_in`](Self::sign_in) once; the returned bearer token is kept
/// and attached to every authenticated request.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl StorefrontClient {
    /// Create a client for the server rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Reuse a token obtained elsewhere.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotSignedIn)?;
        Ok(builder.bearer_auth(token))
    }

    /// `POST /users/signup`
    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<MessageResponse, ClientError> {
        let url = self.base_url.join("/users/signup")?;
        let resp = self.http.post(url).json(req).send().await?;
        parse_response(resp).await
    }

    /// `POST /users/signin`, storing the returned token.
    pub async fn sign_in(&mut self, req: &SignInRequest) -> Result<SignInResponse, ClientError> {
        let url = self.base_url.join("/users/signin")?;
        let resp = self.http.post(url).json(req).send().await?;
        let signed_in: SignInResponse = parse_response(resp).await?;
        self.token = Some(signed_in.token.clone());
        Ok(signed_in)
    }

    /// `GET /fooditems`
    pub async fn menu(&self) -> Result<Vec<FoodItem>, ClientError> {
        let url = self.base_url.join("/fooditems")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /users/profile`
    pub async fn profile(&self) -> Result<ProfileResponse, ClientError> {
        let url = self.base_url.join("/users/profile")?;
        let resp = self.authorized(self.http.get(url))?.send().await?;
        parse_response(resp).await
    }

    /// `PUT /users/profile`
    pub async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ClientError> {
        let url = self.base_url.join("/users/profile")?;
        let resp = self.authorized(self.http.put(url))?.json(req).send().await?;
        parse_response(resp).await
    }

    /// `GET /users/cart`
    pub async fn cart(&self) -> Result<CartResponse, ClientError> {
        let url = self.base_url.join("/users/cart")?;
        let resp = self.authorized(self.http.get(url))?.send().await?;
        parse_response(resp).await
    }

    /// `POST /users/cart/add`
    pub async fn set_cart_quantity(
        &self,
        req: CartAddRequest,
    ) -> Result<CartResponse, ClientError> {
        let url = self.base_url.join("/users/cart/add")?;
        let resp = self.authorized(self.http.post(url))?.json(&req).send().await?;
        parse_response(resp).await
    }

    /// `POST /users/cart/remove`
    pub async fn remove_from_cart(
        &self,
        req: CartRemoveRequest,
    ) -> Result<CartResponse, ClientError> {
        let url = self.base_url.join("/users/cart/remove")?;
        let resp = self.authorized(self.http.post(url))?.json(&req).send().await?;
        parse_response(resp).await
    }

    /// `GET /users/cart/details`
    pub async fn cart_details(&self) -> Result<Vec<CartDetail>, ClientError> {
        let url = self.base_url.join("/users/cart/details")?;
        let resp = self.authorized(self.http.get(url))?.send().await?;
        parse_response(resp).await
    }

    /// `POST /users/orders/place`
    pub async fn place_order(
        &self,
        req: &PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, ClientError> {
        let url = self.base_url.join("/users/orders/place")?;
        let resp = self.authorized(self.http.post(url))?.json(req).send().await?;
        parse_response(resp).await
    }

    /// `GET /users/orders`
    pub async fn orders(&self) -> Result<Vec<OrderView>, ClientError> {
        let url = self.base_url.join("/users/orders")?;
        let resp = self.authorized(self.http.get(url))?.send().await?;
        let list: OrderListResponse = parse_response(resp).await?;
        Ok(list.orders)
    }

    /// `GET /tunnel/status`
    pub async fn relay_status(&self) -> Result<RelayStatus, ClientError> {
        let url = self.base_url.join("/tunnel/status")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
