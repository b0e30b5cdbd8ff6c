use regex::bytes::Regex;

/// One detected license inside a file, with the byte span that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseMatch {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

/// Content-based license detection: bytes in, zero or more matches out.
pub trait Classifier {
    fn classify(&self, content: &[u8]) -> Vec<LicenseMatch>;
}

/// A license is detected when every phrase of any one signature appears
/// and none of the `unless` phrases do.
struct LicenseDef {
    id: &'static str,
    signatures: &'static [&'static [&'static str]],
    unless: &'static [&'static str],
}

const BSD_PREAMBLE: &str = "redistribution and use in source and binary forms with or without \
     modification are permitted provided that the following conditions are met";
const BSD_ENDORSE: &str = "endorse or promote products derived from this software";

const BUILTIN: &[LicenseDef] = &[
    LicenseDef {
        id: "MIT",
        signatures: &[&[
            "permission is hereby granted free of charge to any person obtaining a copy",
            "the above copyright notice and this permission notice shall be included in all \
             copies or substantial portions of the software",
        ]],
        unless: &[],
    },
    LicenseDef {
        id: "Apache-2.0",
        signatures: &[
            &["apache license", "version 2.0 january 2004"],
            &["licensed under the apache license version 2.0"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "BSD-3-Clause",
        signatures: &[&[BSD_PREAMBLE, BSD_ENDORSE]],
        unless: &[],
    },
    LicenseDef {
        id: "BSD-2-Clause",
        signatures: &[&[
            BSD_PREAMBLE,
            "redistributions in binary form must reproduce the above copyright notice",
        ]],
        unless: &[BSD_ENDORSE],
    },
    LicenseDef {
        id: "ISC",
        signatures: &[&[
            "permission to use copy modify and",
            "distribute this software for any purpose with or without fee is hereby granted \
             provided that the above copyright notice and this permission notice appear in all copies",
        ]],
        unless: &[],
    },
    LicenseDef {
        id: "MPL-2.0",
        signatures: &[
            &["mozilla public license version 2.0"],
            &["mozilla public license v 2.0"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "GPL-2.0",
        signatures: &[
            &["gnu general public license version 2 june 1991"],
            &["gnu general public license as published by the free software foundation either version 2"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "GPL-3.0",
        signatures: &[
            &["gnu general public license version 3 29 june 2007"],
            &["gnu general public license as published by the free software foundation either version 3"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "LGPL-2.1",
        signatures: &[
            &["gnu lesser general public license version 2.1 february 1999"],
            &["gnu lesser general public license as published by the free software foundation either version 2.1"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "LGPL-3.0",
        signatures: &[
            &["gnu lesser general public license version 3 29 june 2007"],
            &["gnu lesser general public license as published by the free software foundation either version 3"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "AGPL-3.0",
        signatures: &[
            &["gnu affero general public license version 3 19 november 2007"],
            &["gnu affero general public license as published by the free software foundation either version 3"],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "Unlicense",
        signatures: &[&["this is free and unencumbered software released into the public domain"]],
        unless: &[],
    },
    LicenseDef {
        id: "CC0-1.0",
        signatures: &[
            &["cc0 1.0 universal"],
            &[
                "to the extent possible under law",
                "has waived all copyright and related or neighboring rights",
            ],
        ],
        unless: &[],
    },
    LicenseDef {
        id: "Zlib",
        signatures: &[&[
            "this software is provided as is without any express or implied warranty",
            "permission is granted to anyone to use this software for any purpose including \
             commercial applications",
        ]],
        unless: &[],
    },
    LicenseDef {
        id: "BSL-1.0",
        signatures: &[&["boost software license version 1.0"]],
        unless: &[],
    },
    LicenseDef {
        id: "EPL-2.0",
        signatures: &[&["eclipse public license v 2.0"]],
        unless: &[],
    },
];

struct CompiledLicense {
    id: &'static str,
    signatures: Vec<Vec<Regex>>,
    unless: Vec<Regex>,
}

/// Phrase-based classifier over the built-in license table.
pub struct TextClassifier {
    licenses: Vec<CompiledLicense>,
}

impl TextClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let licenses = BUILTIN
            .iter()
            .map(|def| {
                let signatures = def
                    .signatures
                    .iter()
                    .map(|phrases| phrases.iter().map(|p| phrase_regex(p)).collect())
                    .collect::<Result<Vec<Vec<Regex>>, _>>()?;
                let unless = def
                    .unless
                    .iter()
                    .map(|p| phrase_regex(p))
                    .collect::<Result<Vec<Regex>, _>>()?;
                Ok(CompiledLicense {
                    id: def.id,
                    signatures,
                    unless,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { licenses })
    }
}

impl Classifier for TextClassifier {
    fn classify(&self, content: &[u8]) -> Vec<LicenseMatch> {
        let mut matches: Vec<LicenseMatch> = self
            .licenses
            .iter()
            .filter(|license| !license.unless.iter().any(|re| re.is_match(content)))
            .filter_map(|license| {
                license
                    .signatures
                    .iter()
                    .find_map(|phrases| signature_span(phrases, content))
                    .map(|(start, end)| LicenseMatch {
                        id: license.id.to_string(),
                        start,
                        end,
                    })
            })
            .collect();

        matches.sort_by_key(|m| (m.start, m.end));
        matches
    }
}

/// All license types the built-in classifier can report, sorted and de-duplicated.
pub fn known_licenses() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = BUILTIN.iter().map(|def| def.id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Words of `phrase`, case-insensitive, separated by any run of non-word bytes.
fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let words: Vec<String> = phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    Regex::new(&format!(r"(?i)\b{}\b", words.join(r"\W+")))
}

fn signature_span(phrases: &[Regex], content: &[u8]) -> Option<(usize, usize)> {
    let mut span: Option<(usize, usize)> = None;
    for re in phrases {
        let m = re.find(content)?;
        span = Some(match span {
            Some((start, end)) => (start.min(m.start()), end.max(m.end())),
            None => (m.start(), m.end()),
        });
    }
    span
}
