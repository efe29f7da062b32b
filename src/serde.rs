use std::fmt::{Formatter, Result as FmtResult};

use serde::{
    de::{Error as DeError, IgnoredAny, MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer,
};

use crate::{
    command::{Param, RawCommand},
    pipeline::{Request, Source},
};

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct RequestVisitor;

        impl<'de> Visitor<'de> for RequestVisitor {
            type Value = Request;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str("a request with `url` and `options`")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut source = None;
                let mut commands = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "url" => {
                            let location: String = map.next_value()?;
                            source = Some(Source::from_location(&location));
                        }
                        "options" => commands = Some(map.next_value::<Vec<RawCommand>>()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(Request {
                    source: source.ok_or_else(|| DeError::missing_field("url"))?,
                    commands: commands.unwrap_or_default(),
                })
            }
        }

        d.deserialize_map(RequestVisitor)
    }
}

impl<'de> Deserialize<'de> for RawCommand {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct CommandVisitor;

        impl<'de> Visitor<'de> for CommandVisitor {
            type Value = RawCommand;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str("a command as `[name, param?]` or `{name, param?}`")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let name: String = seq
                    .next_element()?
                    .ok_or_else(|| DeError::invalid_length(0, &self))?;
                let param: Option<Param> = seq.next_element::<Option<Param>>()?.flatten();

                // Anything past the parameter is ignored
                while seq.next_element::<IgnoredAny>()?.is_some() {}

                Ok(RawCommand { name, param })
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut name = None;
                let mut param = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "name" => name = Some(map.next_value::<String>()?),
                        "param" => param = map.next_value::<Option<Param>>()?,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(RawCommand {
                    name: name.ok_or_else(|| DeError::missing_field("name"))?,
                    param,
                })
            }
        }

        d.deserialize_any(CommandVisitor)
    }
}

impl<'de> Deserialize<'de> for Param {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct ParamVisitor;

        impl<'de> Visitor<'de> for ParamVisitor {
            type Value = Param;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str("a number, a string or a list of those")
            }

            fn visit_i64<E: DeError>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Param::Number(v as f64))
            }

            fn visit_u64<E: DeError>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Param::Number(v as f64))
            }

            fn visit_f64<E: DeError>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Param::Number(v))
            }

            fn visit_str<E: DeError>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Param::Text(v.to_owned()))
            }

            fn visit_string<E: DeError>(self, v: String) -> Result<Self::Value, E> {
                Ok(Param::Text(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    list.push(elem);
                }

                Ok(Param::List(list))
            }
        }

        d.deserialize_any(ParamVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_pairs() {
        let commands: Vec<RawCommand> =
            serde_json::from_str(r#"[["spin", "fast"], ["resize", 0.5], ["flip"], ["rain", ["glitter", 3]]]"#)
                .unwrap();

        assert_eq!(
            commands,
            vec![
                RawCommand::new("spin", Some(Param::Text("fast".into()))),
                RawCommand::new("resize", Some(Param::Number(0.5))),
                RawCommand::new("flip", None),
                RawCommand::new(
                    "rain",
                    Some(Param::List(vec![
                        Param::Text("glitter".into()),
                        Param::Number(3.0)
                    ]))
                ),
            ]
        );
    }

    #[test]
    fn command_maps() {
        let command: RawCommand =
            serde_json::from_str(r#"{"name": "rotate", "param": 90}"#).unwrap();
        assert_eq!(command, RawCommand::new("rotate", Some(Param::Number(90.0))));

        let command: RawCommand = serde_json::from_str(r#"["reverse", null]"#).unwrap();
        assert_eq!(command, RawCommand::new("reverse", None));
    }

    #[test]
    fn request_body() {
        let request: Request = serde_json::from_str(
            r#"{"url": "https://cdn.example.com/emote.gif", "options": [["rainbow"]], "extra": true}"#,
        )
        .unwrap();

        assert_eq!(
            request.source,
            Source::Url("https://cdn.example.com/emote.gif".into())
        );
        assert_eq!(request.commands, vec![RawCommand::new("rainbow", None)]);

        assert!(serde_json::from_str::<Request>(r#"{"options": []}"#).is_err());
    }
}
