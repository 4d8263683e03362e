//! User management endpoints.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestOptions},
	services::{describe, describe_with},
};

/// User profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	/// User id.
	pub id: u64,
	/// Login name.
	pub username: String,
	/// Email address.
	pub email: String,
	/// Phone number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// Avatar URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
	/// Account status code.
	pub status: i32,
	/// Creation timestamp as sent by the server.
	pub create_time: String,
	/// Last update timestamp as sent by the server.
	pub update_time: String,
}

/// Filters for [`UserApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Page size.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
	/// Free-text search.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keyword: Option<String>,
	/// Status filter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<i32>,
}

/// One page of users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
	/// Users on this page.
	pub list: Vec<UserInfo>,
	/// Total number of matching users.
	pub total: u64,
	/// Page number.
	pub page: u32,
	/// Page size.
	pub page_size: u32,
}

/// Payload for [`UserApi::create`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserParams {
	/// Login name.
	pub username: String,
	/// Email address.
	pub email: String,
	/// Phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// Initial password.
	pub password: String,
}

/// Payload for [`UserApi::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserParams {
	/// User id.
	pub id: u64,
	/// New login name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// New email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// New phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// New avatar URL.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
}

/// Ids for batch deletion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteParams {
	/// Ids to delete.
	pub ids: Vec<u64>,
}

/// Payload for password resets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordParams {
	/// User id.
	pub id: u64,
	/// Replacement password.
	pub new_password: String,
}

/// Payload for [`UserApi::update_status`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserStatusParams {
	/// User id.
	pub id: u64,
	/// New status code.
	pub status: i32,
}

/// User management endpoints.
#[derive(Debug)]
pub struct UserApi<'a, T>
where
	T: HttpTransport,
{
	client: &'a Client<T>,
}
impl<'a, T> UserApi<'a, T>
where
	T: HttpTransport,
{
	pub(crate) fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// `GET /user/info`: the signed-in user's profile.
	pub async fn info(&self, options: RequestOptions) -> Result<UserInfo> {
		self.client.dispatch_as(describe(Method::Get, "/user/info", options, None)).await
	}

	/// `POST /user/update`.
	pub async fn update(&self, params: &UpdateUserParams, options: RequestOptions) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/user/update",
			params,
			options,
			Some("User information updated successfully."),
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `PUT /user/info` with a partial profile of the signed-in user.
	///
	/// Some deployments expose profile edits here instead of [`update`](Self::update).
	pub async fn update_info<P>(&self, changes: &P, options: RequestOptions) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		let descriptor = describe_with(Method::Put, "/user/info", changes, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `GET /user/list`.
	pub async fn list(
		&self,
		params: &UserListParams,
		options: RequestOptions,
	) -> Result<UserListResponse> {
		let descriptor = describe_with(Method::Get, "/user/list", params, options, None)?;

		self.client.dispatch_as(descriptor).await
	}

	/// `POST /user/create`.
	pub async fn create(&self, params: &CreateUserParams, options: RequestOptions) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/user/create",
			params,
			options,
			Some("User created successfully."),
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `DELETE /user/delete/{id}`.
	pub async fn delete(&self, id: u64, options: RequestOptions) -> Result<Value> {
		let descriptor = describe(
			Method::Delete,
			format!("/user/delete/{id}"),
			options,
			Some("User deleted successfully."),
		);

		self.client.dispatch(descriptor).await
	}

	/// `POST /user/batch-delete`.
	pub async fn batch_delete(&self, ids: &[u64], options: RequestOptions) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/user/batch-delete",
			&BatchDeleteParams { ids: ids.to_vec() },
			options,
			Some("Batch delete succeeded."),
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `POST /user/reset-password`.
	pub async fn reset_password(
		&self,
		params: &ResetPasswordParams,
		options: RequestOptions,
	) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/user/reset-password",
			params,
			options,
			Some("Password reset successfully."),
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `POST /user/update-status`.
	pub async fn update_status(
		&self,
		params: &UpdateUserStatusParams,
		options: RequestOptions,
	) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/user/update-status",
			params,
			options,
			Some("Status updated successfully."),
		)?;

		self.client.dispatch(descriptor).await
	}
}
