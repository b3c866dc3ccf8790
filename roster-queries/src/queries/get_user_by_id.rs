#[allow(clippy::all)]
pub struct GetUserById;

#[allow(clippy::all)]
pub mod get_user_by_id {
    #![allow(dead_code)]

    use roster::codegen::FieldSelector;
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetUserById";
    pub const QUERY: &str = "query GetUserById($id: ID!) {\n  getUserById(id: $id) {\n    id\n    name\n    age\n    isMarried\n  }\n}\n";

    #[allow(dead_code)]
    type Boolean = bool;
    #[allow(dead_code)]
    type Int = i64;
    #[allow(dead_code)]
    type ID = String;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GetUserByIdGetUserById {
        pub id: Option<ID>,
        pub name: Option<String>,
        pub age: Option<Int>,
        #[serde(rename = "isMarried")]
        pub is_married: Option<Boolean>
    }

    impl GetUserByIdGetUserById {
        #[allow(unused_variables)]
        pub(crate) fn selection(variables: &Variables) -> Vec<FieldSelector> {
            vec![
                FieldSelector::Scalar("id", String::new()),
                FieldSelector::Scalar("name", String::new()),
                FieldSelector::Scalar("age", String::new()),
                FieldSelector::Scalar("isMarried", String::new())
            ]
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Variables {
        pub id: ID
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "getUserById")]
        pub get_user_by_id: Option<GetUserByIdGetUserById>
    }

    impl roster::codegen::QueryInfo<Variables> for ResponseData {
        fn selection(variables: &Variables) -> Vec<FieldSelector> {
            vec![FieldSelector::Object(
                "getUserById",
                format!("(id:{:?})", &variables.id),
                "User",
                GetUserByIdGetUserById::selection(variables)
            )]
        }
    }
}

#[allow(clippy::all)]
impl roster::GraphQLQuery for GetUserById {
    type Variables = get_user_by_id::Variables;
    type ResponseData = get_user_by_id::ResponseData;

    fn build_query(
        variables: Self::Variables
    ) -> (
        roster::QueryBody<Self::Variables>,
        roster::exchange::OperationMeta
    ) {
        let meta = roster::exchange::OperationMeta {
            query_key: 1_290_331_763,
            operation_type: roster::exchange::OperationType::Query,
            involved_types: vec!["User"]
        };

        let body = roster::QueryBody {
            variables,
            query: get_user_by_id::QUERY,
            operation_name: get_user_by_id::OPERATION_NAME
        };

        (body, meta)
    }
}
