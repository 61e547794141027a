use generate::ChatMessage;
use generate::prompt::schema_instruction;

pub const ASSISTANT_INSTRUCTION: &str = "You are a helpful assistant who can submit queries to the \
endpoint based on the user's requests. You always make sure to supply all arguments to any functions you invoke.";

const OUTLINE_QUERY: &str = r#"query KnownDrugsQuery {
  disease(efoId: "EFO_0000756") {
    knownDrugs {
      rows {
        drug {
          name
        }
      }
    }
  }
}"#;

/// Worked example of the tool sequence for a ranking question.
pub fn step_by_step_outline() -> String {
    format!(
        r#"Here is a step-by-step outline of how you would answer a user who asked: 'What are the top 5 medications used to treat melanoma?'
First, you would call `get-disease-id` with the name 'melanoma' to obtain the ID of melanoma, which is "EFO_0000756".
Then, you would use that ID to submit a query to the GraphQL endpoint with the `graphql` tool. The query would be as follows:
{OUTLINE_QUERY}
Then, you would use the `flatten` tool to flatten all of the results into a single list.
Finally, you would call `subset-list` with that list and n = 5, and return this subsetted output to the user."#
    )
}

pub fn build_agent_messages(schema: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(schema_instruction(schema)),
        ChatMessage::system(ASSISTANT_INSTRUCTION),
        ChatMessage::system(step_by_step_outline()),
        ChatMessage::user(question),
    ]
}
