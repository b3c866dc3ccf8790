#[allow(clippy::all)]
pub struct GetUsers;

#[allow(clippy::all)]
pub mod get_users {
    #![allow(dead_code)]

    use roster::codegen::FieldSelector;
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetUsers";
    pub const QUERY: &str = "query GetUsers {\n  getUsers {\n    id\n    name\n    age\n    isMarried\n  }\n}\n";

    #[allow(dead_code)]
    type Boolean = bool;
    #[allow(dead_code)]
    type Int = i64;
    #[allow(dead_code)]
    type ID = String;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GetUsersGetUsers {
        pub id: Option<ID>,
        pub name: Option<String>,
        pub age: Option<Int>,
        #[serde(rename = "isMarried")]
        pub is_married: Option<Boolean>
    }

    impl GetUsersGetUsers {
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
    pub struct Variables;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "getUsers")]
        pub get_users: Option<Vec<Option<GetUsersGetUsers>>>
    }

    impl roster::codegen::QueryInfo<Variables> for ResponseData {
        fn selection(variables: &Variables) -> Vec<FieldSelector> {
            vec![FieldSelector::Object(
                "getUsers",
                String::new(),
                "User",
                GetUsersGetUsers::selection(variables)
            )]
        }
    }
}

#[allow(clippy::all)]
impl roster::GraphQLQuery for GetUsers {
    type Variables = get_users::Variables;
    type ResponseData = get_users::ResponseData;

    fn build_query(
        variables: Self::Variables
    ) -> (
        roster::QueryBody<Self::Variables>,
        roster::exchange::OperationMeta
    ) {
        let meta = roster::exchange::OperationMeta {
            query_key: 2_813_904_512,
            operation_type: roster::exchange::OperationType::Query,
            involved_types: vec!["User"]
        };

        let body = roster::QueryBody {
            variables,
            query: get_users::QUERY,
            operation_name: get_users::OPERATION_NAME
        };

        (body, meta)
    }
}
