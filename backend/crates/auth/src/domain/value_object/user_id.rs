use kernel::id::Id;

/// Internal user identifier; never leaves the auth service
pub struct UserMarker;
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_v4() {
        assert_eq!(UserId::new().as_uuid().get_version_num(), 4);
    }
}
