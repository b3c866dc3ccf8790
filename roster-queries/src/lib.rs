//! The operations the roster app runs against the API. Each operation is a zero-size type
//! implementing [`roster::GraphQLQuery`] next to a module with the same name in snake case that
//! holds its query text, `Variables` and `ResponseData`.

mod queries;
pub use queries::*;

/// The selection shared by every operation that returns users.
pub const USER_FIELDS: &str = "id name age isMarried";

#[cfg(test)]
mod tests {
    use super::*;
    use roster::Response;
    use serde_json::json;

    #[test]
    fn every_operation_selects_the_user_fields() {
        let queries = [
            get_users::get_users::QUERY,
            get_user_by_id::get_user_by_id::QUERY,
            create_user::create_user::QUERY
        ];
        for query in queries {
            let selected: Vec<&str> = query
                .split_whitespace()
                .filter(|word| USER_FIELDS.split(' ').any(|field| field == *word))
                .collect();
            assert_eq!(selected.join(" "), USER_FIELDS, "in {query}");
        }
    }

    #[test]
    fn null_fields_decode_as_none() {
        let response: Response<get_users::get_users::ResponseData> =
            serde_json::from_value(json!({
                "data": { "getUsers": null },
                "errors": [{ "message": "store down", "path": ["getUsers"] }]
            }))
            .unwrap();
        assert_eq!(response.data.as_ref().unwrap().get_users, None);
        assert_eq!(response.error_message(), Some("store down"));

        let response: Response<get_users::get_users::ResponseData> =
            serde_json::from_value(json!({
                "data": {
                    "getUsers": [
                        { "id": "1", "name": null, "age": null, "isMarried": null },
                        null
                    ]
                }
            }))
            .unwrap();
        let users = response.data.unwrap().get_users.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[1].is_none());
        let first = users[0].as_ref().unwrap();
        assert_eq!(first.id.as_deref(), Some("1"));
        assert_eq!((first.name.as_ref(), first.age, first.is_married), (None, None, None));
    }
}
