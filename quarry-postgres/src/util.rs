use quarry_core::{QueryOutcome, RowLabeled, RowNames};
use tokio_postgres::SimpleQueryMessage;

/// Fold the text protocol messages of one, possibly multi statement,
/// execution into a single outcome: every returned row plus the total
/// affected row count.
pub(crate) fn outcome_from_messages(messages: Vec<SimpleQueryMessage>) -> QueryOutcome {
    let mut outcome = QueryOutcome::default();
    let mut labels: Option<RowNames> = None;
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                labels = Some(columns.iter().map(|c| c.name().to_string()).collect());
            }
            SimpleQueryMessage::Row(row) => {
                let labels = labels.get_or_insert_with(|| {
                    row.columns().iter().map(|c| c.name().to_string()).collect()
                });
                outcome.rows.push(RowLabeled::new(
                    labels.clone(),
                    (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect(),
                ));
            }
            SimpleQueryMessage::CommandComplete(count) => outcome.row_count += count,
            _ => {}
        }
    }
    outcome
}
