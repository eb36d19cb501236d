//! Text forms of dates, times and UUIDs as they appear in JSON strings.

use crate::error::JsonError;
use anyhow::Result;
use time::{OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339, macros::format_description};
use uuid::Uuid;

pub(crate) fn format_date_time(value: &PrimitiveDateTime) -> Result<String> {
	let text = if value.nanosecond() == 0 {
		value.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))?
	} else {
		value.format(format_description!(
			"[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
		))?
	};
	Ok(text)
}

pub(crate) fn parse_date_time(text: &str) -> Result<PrimitiveDateTime> {
	PrimitiveDateTime::parse(
		text,
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
	)
	.map_err(|_| JsonError::format(format!("'{text}' is not a valid date and time")).into())
}

pub(crate) fn format_offset_date_time(value: &OffsetDateTime) -> Result<String> {
	Ok(value.format(&Rfc3339)?)
}

pub(crate) fn parse_offset_date_time(text: &str) -> Result<OffsetDateTime> {
	OffsetDateTime::parse(text, &Rfc3339)
		.map_err(|_| JsonError::format(format!("'{text}' is not a valid RFC 3339 date and time")).into())
}

pub(crate) fn parse_uuid(text: &str) -> Result<Uuid> {
	Uuid::parse_str(text).map_err(|_| JsonError::format(format!("'{text}' is not a valid UUID")).into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::datetime;

	#[test]
	fn test_date_time() -> Result<()> {
		let value = datetime!(2024-02-29 13:14:15);
		assert_eq!(format_date_time(&value)?, "2024-02-29T13:14:15");
		assert_eq!(parse_date_time("2024-02-29T13:14:15")?, value);

		let value = datetime!(2024-02-29 13:14:15.25);
		assert_eq!(format_date_time(&value)?, "2024-02-29T13:14:15.25");
		assert_eq!(parse_date_time("2024-02-29T13:14:15.25")?, value);

		assert!(parse_date_time("2024-02-30T00:00:00").is_err());
		assert!(parse_date_time("yesterday").is_err());
		Ok(())
	}

	#[test]
	fn test_offset_date_time() -> Result<()> {
		let value = datetime!(2001-02-03 04:05:06 +02:00);
		let text = format_offset_date_time(&value)?;
		assert_eq!(text, "2001-02-03T04:05:06+02:00");
		assert_eq!(parse_offset_date_time(&text)?, value);
		assert!(parse_offset_date_time("2001-02-03T04:05:06").is_err());
		Ok(())
	}

	#[test]
	fn test_uuid() -> Result<()> {
		let value = parse_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8")?;
		assert_eq!(value.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
		assert!(parse_uuid("not-a-uuid").is_err());
		Ok(())
	}
}
