//! Authentication endpoints.
//!
//! These wrappers only talk to the server. Storing the returned token is up to the caller,
//! usually through [`Client::sign_in`].

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestOptions},
	services::{ResetPasswordParams, UserInfo, describe, describe_with},
};

/// Credentials for [`AuthApi::login`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginParams {
	/// Login name.
	pub username: String,
	/// Password.
	pub password: String,
	/// Captcha answer, when the server asks for one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub captcha: Option<String>,
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// Bearer token.
	pub token: String,
	/// Profile of the signed-in user.
	pub user_info: UserInfo,
}

/// Result of a token refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
	/// Replacement bearer token.
	pub token: String,
}

/// Captcha challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
	/// Challenge id.
	pub captcha_id: String,
	/// Encoded challenge image.
	pub captcha_image: String,
}

/// Payload for [`AuthApi::verify_captcha`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCaptchaParams {
	/// Challenge id.
	pub captcha_id: String,
	/// User's answer.
	pub captcha_code: String,
}

/// Payload for [`AuthApi::forgot_password`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordParams {
	/// Account email.
	pub email: String,
	/// Challenge id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub captcha_id: Option<String>,
	/// User's answer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub captcha_code: Option<String>,
}

/// Authentication endpoints.
#[derive(Debug)]
pub struct AuthApi<'a, T>
where
	T: HttpTransport,
{
	client: &'a Client<T>,
}
impl<'a, T> AuthApi<'a, T>
where
	T: HttpTransport,
{
	pub(crate) fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// `POST /auth/login`.
	pub async fn login(&self, params: &LoginParams, options: RequestOptions) -> Result<LoginResponse> {
		let descriptor =
			describe_with(Method::Post, "/auth/login", params, options, Some("Login successful."))?;

		self.client.dispatch_as(descriptor).await
	}

	/// `POST /auth/logout`.
	pub async fn logout(&self, options: RequestOptions) -> Result<Value> {
		let descriptor =
			describe(Method::Post, "/auth/logout", options, Some("Signed out successfully."));

		self.client.dispatch(descriptor).await
	}

	/// `POST /auth/refresh`.
	pub async fn refresh_token(&self, options: RequestOptions) -> Result<RefreshTokenResponse> {
		self.client.dispatch_as(describe(Method::Post, "/auth/refresh", options, None)).await
	}

	/// `GET /auth/captcha`.
	pub async fn captcha(&self, options: RequestOptions) -> Result<CaptchaResponse> {
		self.client.dispatch_as(describe(Method::Get, "/auth/captcha", options, None)).await
	}

	/// `POST /auth/verify-captcha`.
	pub async fn verify_captcha(
		&self,
		params: &VerifyCaptchaParams,
		options: RequestOptions,
	) -> Result<Value> {
		let descriptor = describe_with(Method::Post, "/auth/verify-captcha", params, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `POST /auth/forgot-password`.
	pub async fn forgot_password(
		&self,
		params: &ForgotPasswordParams,
		options: RequestOptions,
	) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/auth/forgot-password",
			params,
			options,
			Some("Password reset email sent."),
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `POST /auth/reset-password`.
	pub async fn reset_password(
		&self,
		params: &ResetPasswordParams,
		options: RequestOptions,
	) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/auth/reset-password",
			params,
			options,
			Some("Password reset successfully."),
		)?;

		self.client.dispatch(descriptor).await
	}
}
