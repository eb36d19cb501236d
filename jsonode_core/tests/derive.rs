use anyhow::Result;
use jsonode_core::{
	CamelCase, ErrorKind, JsonElement, JsonNode, JsonType, SerializerOptions, error_kind, from_node, from_str, to_node,
	to_string,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use time::{OffsetDateTime, macros::datetime};
use uuid::Uuid;

#[derive(Debug, Default, PartialEq, JsonType)]
struct Account {
	#[json(order = -1)]
	account_id: Uuid,
	display_name: String,
	#[json(rename = "mail")]
	email: Option<String>,
	#[json(number_handling(AllowReadingFromString, WriteAsString))]
	balance: i64,
	created: Option<OffsetDateTime>,
	tags: Vec<String>,
	#[json(ignore)]
	session: u32,
	#[json(extension_data)]
	unknown: BTreeMap<String, JsonElement>,
}

fn camel_case() -> Result<SerializerOptions> {
	let mut options = SerializerOptions::default();
	options.set_property_naming_policy(CamelCase)?;
	Ok(options)
}

#[test]
fn derived_object_round_trip() -> Result<()> {
	let options = camel_case()?;
	let account = Account {
		account_id: Uuid::nil(),
		display_name: "Ada".into(),
		email: Some("ada@example.org".into()),
		balance: -12,
		created: Some(datetime!(2024-02-03 04:05:06 UTC)),
		tags: vec!["admin".into()],
		session: 99,
		unknown: BTreeMap::from([("legacy".to_string(), JsonElement::from(1))]),
	};
	let json = to_string(&account, &options)?;
	assert_eq!(
		json,
		concat!(
			r#"{"accountId":"00000000-0000-0000-0000-000000000000","displayName":"Ada","mail":"ada@example.org","#,
			r#""balance":"-12","created":"2024-02-03T04:05:06Z","tags":["admin"],"legacy":1}"#
		)
	);

	let read: Account = from_str(&json, &options)?;
	assert_eq!(read, Account { session: 0, ..account });
	Ok(())
}

#[test]
fn derived_object_defaults_for_missing_members() -> Result<()> {
	let options = camel_case()?;
	let read: Account = from_str(r#"{"displayName":"x","balance":5,"session":3}"#, &options)?;
	assert_eq!(read.display_name, "x");
	assert_eq!(read.balance, 5);
	assert_eq!(read.session, 0);
	assert!(read.unknown.contains_key("session"));
	Ok(())
}

#[derive(Debug, PartialEq, JsonType)]
#[json(constructor, on_deserialized = Self::normalize)]
struct Temperature {
	#[json(read_only)]
	city: String,
	#[json(number_handling(AllowNamedFloatingPointLiterals))]
	celsius: f64,
	reading: Option<u8>,
	#[json(ignore)]
	note: String,
}

impl Temperature {
	fn normalize(&mut self) {
		self.city = self.city.to_uppercase();
	}
}

#[test]
fn derived_constructor() -> Result<()> {
	let options = SerializerOptions::default();
	let read: Temperature = from_str(r#"{"celsius":"NaN","city":"oslo"}"#, &options)?;
	assert_eq!(read.city, "OSLO");
	assert!(read.celsius.is_nan());
	assert_eq!(read.reading, None);
	assert_eq!(read.note, "");

	let value = Temperature {
		city: "Rome".into(),
		celsius: 21.5,
		reading: Some(2),
		note: "skipped".into(),
	};
	assert_eq!(
		to_string(&value, &options)?,
		r#"{"city":"Rome","celsius":21.5,"reading":2}"#
	);

	let err = from_str::<Temperature>(r#"{"city":"oslo"}"#, &options).unwrap_err();
	assert_eq!(error_kind(&err), Some(ErrorKind::Format));
	assert!(err.to_string().contains("'celsius'"), "{err}");
	Ok(())
}

#[derive(Debug, Default, JsonType)]
struct Clash {
	name: String,
	#[json(rename = "name")]
	other: String,
}

#[derive(Debug, Default, JsonType)]
struct TwoExtensions {
	#[json(extension_data)]
	first: BTreeMap<String, JsonElement>,
	#[json(extension_data)]
	second: BTreeMap<String, JsonElement>,
}

#[derive(Debug, Default, JsonType)]
struct BadExtension {
	#[json(extension_data)]
	rest: BTreeMap<String, String>,
}

#[test]
fn invalid_declarations() {
	let options = SerializerOptions::default();
	for err in [
		from_str::<Clash>("{}", &options).unwrap_err(),
		from_str::<TwoExtensions>("{}", &options).unwrap_err(),
		to_string(&BadExtension::default(), &options).unwrap_err(),
	] {
		assert_eq!(error_kind(&err), Some(ErrorKind::Configuration), "{err}");
	}
}

#[test]
fn options_lock_after_first_use() -> Result<()> {
	let mut options = camel_case()?;
	to_string(&Account::default(), &options)?;
	let err = options.set_write_indented(true).unwrap_err();
	assert_eq!(error_kind(&err), Some(ErrorKind::Configuration));
	assert!(options.cached_descriptors() > 1);
	Ok(())
}

#[test]
fn nodes_and_objects() -> Result<()> {
	let options = camel_case()?;
	let node = to_node(
		&Account {
			display_name: "n".into(),
			..Account::default()
		},
		&options,
	)?
	.unwrap();
	node.set("displayName", "changed")?;
	node.as_object()?.remove("mail")?;
	let account: Account = from_node(Some(&node), &options)?;
	assert_eq!(account.display_name, "changed");
	assert_eq!(account.email, None);

	let parsed = JsonNode::parse_str(r#"{"tags":["a","b"]}"#)?;
	let account: Account = from_node(parsed.as_ref(), &options)?;
	assert_eq!(account.tags, vec!["a", "b"]);
	Ok(())
}
