//! GraphQL documents sent to GitHub.
//!
//! Selections here must stay in step with the field sets in `types.rs`, which
//! read the same fields back out of the entity store.

pub const GET_ISSUES_OF_REPO: &str = r#"
query(
  $repositoryName: String!
  $repositoryOwner: String!
  $issueState: IssueState!
  $first: Int!
  $cursor: String
) {
  repository(name: $repositoryName, owner: $repositoryOwner) {
    issues(first: $first, states: [$issueState], after: $cursor) {
      edges {
        cursor
        node {
          id
          number
          state
          title
          url
          bodyHTML
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

pub const GET_REPOS_OF_CURRENT_USER: &str = r#"
query($first: Int!, $cursor: String) {
  viewer {
    repositories(
      first: $first
      orderBy: { direction: DESC, field: STARGAZERS }
      after: $cursor
    ) {
      edges {
        cursor
        node {
          ...repository
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}

fragment repository on Repository {
  id
  name
  url
  descriptionHTML
  primaryLanguage {
    name
  }
  owner {
    __typename
    id
    login
    url
  }
  stargazers {
    totalCount
  }
  viewerHasStarred
  watchers {
    totalCount
  }
  viewerSubscription
}
"#;

pub const STAR_REPO: &str = r#"
mutation($id: ID!) {
  addStar(input: { starrableId: $id }) {
    starrable {
      __typename
      id
      viewerHasStarred
    }
  }
}
"#;

pub const UN_STAR_REPO: &str = r#"
mutation($id: ID!) {
  removeStar(input: { starrableId: $id }) {
    starrable {
      __typename
      id
      viewerHasStarred
    }
  }
}
"#;

pub const ADD_COMMENT: &str = r#"
mutation($subjectId: ID!, $body: String!) {
  addComment(input: { subjectId: $subjectId, body: $body }) {
    commentEdge {
      node {
        __typename
        id
        body
        createdAt
        author {
          login
        }
      }
    }
  }
}
"#;
