#[allow(clippy::all)]
pub struct CreateUser;

#[allow(clippy::all)]
pub mod create_user {
    #![allow(dead_code)]

    use roster::codegen::FieldSelector;
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "CreateUser";
    pub const QUERY: &str = "mutation CreateUser($name: String!, $age: Int!, $isMarried: Boolean!) {\n  createUser(name: $name, age: $age, isMarried: $isMarried) {\n    id\n    name\n    age\n    isMarried\n  }\n}\n";

    #[allow(dead_code)]
    type Boolean = bool;
    #[allow(dead_code)]
    type Int = i64;
    #[allow(dead_code)]
    type ID = String;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CreateUserCreateUser {
        pub id: Option<ID>,
        pub name: Option<String>,
        pub age: Option<Int>,
        #[serde(rename = "isMarried")]
        pub is_married: Option<Boolean>
    }

    impl CreateUserCreateUser {
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
        pub name: String,
        pub age: Int,
        #[serde(rename = "isMarried")]
        pub is_married: Boolean
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "createUser")]
        pub create_user: Option<CreateUserCreateUser>
    }

    impl roster::codegen::QueryInfo<Variables> for ResponseData {
        fn selection(variables: &Variables) -> Vec<FieldSelector> {
            vec![FieldSelector::Object(
                "createUser",
                format!(
                    "(name:{:?},age:{:?},isMarried:{:?})",
                    &variables.name, &variables.age, &variables.is_married
                ),
                "User",
                CreateUserCreateUser::selection(variables)
            )]
        }
    }
}

#[allow(clippy::all)]
impl roster::GraphQLQuery for CreateUser {
    type Variables = create_user::Variables;
    type ResponseData = create_user::ResponseData;

    fn build_query(
        variables: Self::Variables
    ) -> (
        roster::QueryBody<Self::Variables>,
        roster::exchange::OperationMeta
    ) {
        let meta = roster::exchange::OperationMeta {
            query_key: 3_675_019_208,
            operation_type: roster::exchange::OperationType::Mutation,
            involved_types: vec!["User"]
        };

        let body = roster::QueryBody {
            variables,
            query: create_user::QUERY,
            operation_name: create_user::OPERATION_NAME
        };

        (body, meta)
    }
}
