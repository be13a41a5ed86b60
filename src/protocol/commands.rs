use crate::error::{Error, Result};
use crate::models::{SortCriterion, SortField, ThreadAlgorithm};

use super::value::Value;

const REVERSE: &str = "REVERSE";

/// Encode sort criteria as a list, `(REVERSE SIZE DATE)`.
pub fn format_sort_criteria(criteria: &[SortCriterion]) -> Value {
    let mut fields = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        if criterion.reverse {
            fields.push(Value::atom(REVERSE));
        }
        fields.push(Value::atom(criterion.field.as_str()));
    }
    Value::List(fields)
}

/// Decode a sort criteria list. `REVERSE` applies to the key right after it
/// and must be followed by one.
pub fn parse_sort_criteria(value: &Value) -> Result<Vec<SortCriterion>> {
    let list = value.as_list().ok_or_else(|| {
        Error::InvalidArguments("list is required as a sort criteria".to_string())
    })?;

    let mut criteria = Vec::with_capacity(list.len());
    let mut reverse = false;
    for item in list {
        let key = item
            .as_text()
            .ok_or_else(|| Error::InvalidArguments("string is required as a sort key".to_string()))?;

        if key.eq_ignore_ascii_case(REVERSE) {
            reverse = true;
            continue;
        }

        criteria.push(SortCriterion {
            field: key.parse::<SortField>()?,
            reverse,
        });
        reverse = false;
    }

    if reverse {
        return Err(Error::MissingSortKey);
    }

    Ok(criteria)
}

fn command_name(uid: bool, name: &str) -> String {
    if uid {
        format!("UID {name}")
    } else {
        name.to_string()
    }
}

fn parse_charset(value: &Value) -> Result<String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidArguments("charset should be a string".to_string()))
}

fn needs_decoding(charset: &str) -> bool {
    !(charset.is_empty()
        || charset.eq_ignore_ascii_case("UTF-8")
        || charset.eq_ignore_ascii_case("US-ASCII"))
}

/// A SORT command. Search keys are carried as-is; interpreting them is up to
/// the mailbox backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCommand {
    pub uid: bool,
    pub criteria: Vec<SortCriterion>,
    pub charset: String,
    pub search: Vec<Value>,
}

impl SortCommand {
    pub fn new(criteria: Vec<SortCriterion>, search: Vec<Value>) -> Self {
        Self {
            uid: false,
            criteria,
            charset: "UTF-8".to_string(),
            search,
        }
    }

    pub fn name(&self) -> String {
        command_name(self.uid, "SORT")
    }

    /// Argument list: criteria, charset, then the search keys.
    pub fn arguments(&self) -> Vec<Value> {
        let mut arguments = Vec::with_capacity(self.search.len() + 2);
        arguments.push(format_sort_criteria(&self.criteria));
        arguments.push(Value::atom(self.charset.as_str()));
        arguments.extend(self.search.iter().cloned());
        arguments
    }

    /// Decode the arguments of a received SORT command. Unlike SEARCH, the
    /// charset is mandatory and has no `CHARSET` keyword.
    pub fn from_arguments(uid: bool, arguments: &[Value]) -> Result<Self> {
        let [criteria, charset, search @ ..] = arguments else {
            return Err(Error::InvalidArguments("not enough SORT arguments".to_string()));
        };
        if search.is_empty() {
            return Err(Error::InvalidArguments("not enough SORT arguments".to_string()));
        }

        Ok(Self {
            uid,
            criteria: parse_sort_criteria(criteria)?,
            charset: parse_charset(charset)?,
            search: search.to_vec(),
        })
    }

    /// Whether search strings must be decoded from `charset` before use.
    pub fn needs_charset_decoding(&self) -> bool {
        needs_decoding(&self.charset)
    }
}

/// A THREAD command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadCommand {
    pub uid: bool,
    pub algorithm: ThreadAlgorithm,
    pub charset: String,
    pub search: Vec<Value>,
}

impl ThreadCommand {
    pub fn new(algorithm: ThreadAlgorithm, search: Vec<Value>) -> Self {
        Self {
            uid: false,
            algorithm,
            charset: "UTF-8".to_string(),
            search,
        }
    }

    pub fn name(&self) -> String {
        command_name(self.uid, "THREAD")
    }

    /// Argument list: algorithm, charset, then the search keys.
    pub fn arguments(&self) -> Vec<Value> {
        let mut arguments = Vec::with_capacity(self.search.len() + 2);
        arguments.push(Value::atom(self.algorithm.as_str()));
        arguments.push(Value::atom(self.charset.as_str()));
        arguments.extend(self.search.iter().cloned());
        arguments
    }

    pub fn from_arguments(uid: bool, arguments: &[Value]) -> Result<Self> {
        let [algorithm, charset, search @ ..] = arguments else {
            return Err(Error::InvalidArguments("not enough THREAD arguments".to_string()));
        };
        if search.is_empty() {
            return Err(Error::InvalidArguments("not enough THREAD arguments".to_string()));
        }

        let algorithm = algorithm.as_text().ok_or_else(|| {
            Error::InvalidArguments("first argument should be a thread algorithm".to_string())
        })?;

        Ok(Self {
            uid,
            algorithm: algorithm.parse()?,
            charset: parse_charset(charset)?,
            search: search.to_vec(),
        })
    }

    pub fn needs_charset_decoding(&self) -> bool {
        needs_decoding(&self.charset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Vec<Value> {
        Value::parse_line(text).unwrap()
    }

    #[test]
    fn test_format_sort_criteria() {
        let criteria = vec![
            SortCriterion::new(SortField::From),
            SortCriterion::reversed(SortField::Size),
        ];
        assert_eq!(format_sort_criteria(&criteria).to_string(), "(FROM REVERSE SIZE)");
    }

    #[test]
    fn test_parse_sort_criteria() {
        let criteria = parse_sort_criteria(&line("(reverse arrival Subject)")[0]).unwrap();
        assert_eq!(
            criteria,
            vec![
                SortCriterion::reversed(SortField::Arrival),
                SortCriterion::new(SortField::Subject),
            ]
        );
    }

    #[test]
    fn test_parse_sort_criteria_errors() {
        assert_eq!(
            parse_sort_criteria(&line("(DATE REVERSE)")[0]),
            Err(Error::MissingSortKey)
        );
        assert_eq!(
            parse_sort_criteria(&line("(SENDER)")[0]),
            Err(Error::UnknownSortKey("SENDER".to_string()))
        );
        assert!(matches!(
            parse_sort_criteria(&Value::atom("DATE")),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            parse_sort_criteria(&line("((DATE))")[0]),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_sort_command_arguments() {
        let mut command = SortCommand::new(
            vec![SortCriterion::new(SortField::From), SortCriterion::reversed(SortField::Size)],
            line("1:10"),
        );
        command.uid = true;

        assert_eq!(command.name(), "UID SORT");
        let arguments = command.arguments();
        let text: Vec<String> = arguments.iter().map(Value::to_string).collect();
        assert_eq!(text.join(" "), "(FROM REVERSE SIZE) UTF-8 1:10");

        assert_eq!(SortCommand::from_arguments(true, &arguments).unwrap(), command);
        assert!(!command.needs_charset_decoding());
    }

    #[test]
    fn test_sort_command_requires_search_keys() {
        assert!(matches!(
            SortCommand::from_arguments(false, &line("(DATE) UTF-8")),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            SortCommand::from_arguments(false, &line("(DATE) (UTF-8) ALL")),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_thread_command_round_trip() {
        let arguments = line(r#"references "iso-8859-1" SINCE 5-Jul-2019"#);
        let command = ThreadCommand::from_arguments(false, &arguments).unwrap();
        assert_eq!(command.algorithm, ThreadAlgorithm::References);
        assert_eq!(command.charset, "iso-8859-1");
        assert!(command.needs_charset_decoding());
        assert_eq!(command.search, line("SINCE 5-Jul-2019"));
        assert_eq!(command.name(), "THREAD");

        let rebuilt: Vec<String> = command.arguments().iter().map(Value::to_string).collect();
        assert_eq!(rebuilt.join(" "), "REFERENCES iso-8859-1 SINCE 5-Jul-2019");
    }

    #[test]
    fn test_thread_command_rejects_unknown_algorithm() {
        assert!(matches!(
            ThreadCommand::from_arguments(false, &line("JWZ UTF-8 ALL")),
            Err(Error::UnknownThreadAlgorithm(_))
        ));
        assert!(matches!(
            ThreadCommand::from_arguments(false, &line("REFERENCES")),
            Err(Error::InvalidArguments(_))
        ));
    }
}
