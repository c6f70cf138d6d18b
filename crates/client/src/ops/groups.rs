//! Group membership listing.

use biblion_core::{GroupDto, Method, RestRequest, RestResponse, Result};

use crate::command::Operation;
use crate::ops::expect_status;

/// Lists the groups a user belongs to.
///
/// This endpoint lives outside any library scope, so the operation carries
/// the user id itself and runs through [`crate::command::Command::unscoped`].
pub struct GetUserGroups {
    user_id: String,
}

impl GetUserGroups {
    /// Listing of the given user's groups.
    pub fn new(user_id: impl Into<String>) -> Self {
        GetUserGroups {
            user_id: user_id.into(),
        }
    }
}

impl Operation for GetUserGroups {
    type Output = Vec<GroupDto>;

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Get)
            .path("users")
            .path(self.user_id.clone())
            .path("groups")
    }

    fn decode(self, response: RestResponse) -> Result<Vec<GroupDto>> {
        expect_status(&response, 200)?;
        response.decode()
    }
}
