use classcheck_class_file::{
    attributes::Attribute, AccessFlags, ClassFile, ClassFileError, ErrorKind, JavaVersion,
    ParserOptions, Tag,
};
use classcheck_symbols::SymbolTable;

const PUBLIC_SUPER: u16 = 0x0021;
const PUBLIC: u16 = 0x0001;
const PRIVATE: u16 = 0x0002;
const STATIC: u16 = 0x0008;
const FINAL: u16 = 0x0010;

/// Assembles class files entry by entry.
struct ClassBuilder {
    minor: u16,
    major: u16,
    pool: Vec<u8>,
    pool_count: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    fn new(name: &str) -> Self {
        Self::with_version(name, 52)
    }

    fn with_version(name: &str, major: u16) -> Self {
        let mut builder = ClassBuilder {
            minor: 0,
            major,
            pool: Vec::new(),
            pool_count: 1,
            access_flags: PUBLIC_SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(name);
        if name != "java/lang/Object" {
            builder.super_class = builder.class("java/lang/Object");
        }
        builder
    }

    fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool.extend_from_slice(bytes);
        self.pool_count += slots;
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let encoded = cesu8::to_java_cesu8(s);
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&encoded);
        self.entry(&bytes, 1)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.entry(&[&[7][..], &name_index.to_be_bytes()].concat(), 1)
    }

    fn integer(&mut self, value: i32) -> u16 {
        self.entry(&[&[3][..], &value.to_be_bytes()].concat(), 1)
    }

    fn float(&mut self, value: f32) -> u16 {
        self.entry(&[&[4][..], &value.to_bits().to_be_bytes()].concat(), 1)
    }

    fn long(&mut self, value: i64) -> u16 {
        self.entry(&[&[5][..], &value.to_be_bytes()].concat(), 2)
    }

    fn double(&mut self, value: f64) -> u16 {
        self.entry(&[&[6][..], &value.to_bits().to_be_bytes()].concat(), 2)
    }

    fn string(&mut self, s: &str) -> u16 {
        let string_index = self.utf8(s);
        self.entry(&[&[8][..], &string_index.to_be_bytes()].concat(), 1)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.entry(
            &[&[12][..], &name_index.to_be_bytes(), &descriptor_index.to_be_bytes()].concat(),
            1,
        )
    }

    fn invoke_dynamic(&mut self, bootstrap_method: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.entry(
            &[&[18][..], &bootstrap_method.to_be_bytes(), &name_and_type.to_be_bytes()].concat(),
            1,
        )
    }

    fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        self.attribute_with_length(name, info, info.len() as u32)
    }

    fn attribute_with_length(&mut self, name: &str, info: &[u8], length: u32) -> Vec<u8> {
        let name_index = self.utf8(name);
        [&name_index.to_be_bytes()[..], &length.to_be_bytes(), info].concat()
    }

    /// A `Code` attribute whose body is a single `return`.
    fn code(&mut self, max_locals: u16, exception_table: &[[u16; 4]], attributes: &[Vec<u8>]) -> Vec<u8> {
        let mut info = Vec::new();
        info.extend_from_slice(&1u16.to_be_bytes());
        info.extend_from_slice(&max_locals.to_be_bytes());
        info.extend_from_slice(&1u32.to_be_bytes());
        info.push(0xb1);
        info.extend_from_slice(&(exception_table.len() as u16).to_be_bytes());
        for entry in exception_table {
            for value in entry {
                info.extend_from_slice(&value.to_be_bytes());
            }
        }
        push_attributes(&mut info, attributes);
        self.attribute("Code", &info)
    }

    fn field(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.fields.push(member);
    }

    fn method(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.methods.push(member);
    }

    /// A method whose body is a single `return`.
    fn simple_method(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let code = self.code(255, &[], &[]);
        self.method(access_flags, name, descriptor, &[code]);
    }

    fn member(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) -> Vec<u8> {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut member = Vec::new();
        member.extend_from_slice(&access_flags.to_be_bytes());
        member.extend_from_slice(&name_index.to_be_bytes());
        member.extend_from_slice(&descriptor_index.to_be_bytes());
        push_attributes(&mut member, attributes);
        member
    }

    fn class_attribute(&mut self, name: &str, info: &[u8]) {
        let attribute = self.attribute(name, info);
        self.attributes.push(attribute);
    }

    fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        bytes.extend_from_slice(&self.minor.to_be_bytes());
        bytes.extend_from_slice(&self.major.to_be_bytes());
        bytes.extend_from_slice(&self.pool_count.to_be_bytes());
        bytes.extend_from_slice(&self.pool);
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        push_members(&mut bytes, &self.fields);
        push_members(&mut bytes, &self.methods);
        push_attributes(&mut bytes, &self.attributes);
        bytes
    }
}

fn push_attributes(out: &mut Vec<u8>, attributes: &[Vec<u8>]) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for attribute in attributes {
        out.extend_from_slice(attribute);
    }
}

fn push_members(out: &mut Vec<u8>, members: &[Vec<u8>]) {
    push_attributes(out, members);
}

fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn parse(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
    parse_with(bytes, &ParserOptions::default())
}

fn parse_with(bytes: &[u8], options: &ParserOptions) -> Result<ClassFile, ClassFileError> {
    ClassFile::parse(bytes, options, &SymbolTable::new())
}

fn class_format_message(result: Result<ClassFile, ClassFileError>) -> String {
    match result {
        Err(ClassFileError::ClassFormat(message)) => message,
        other => panic!("expected a class format error, got {:?}", other),
    }
}

#[test]
fn it_should_parse_a_minimal_class() {
    let class_file = parse(&ClassBuilder::new("my/Minimal").build()).unwrap();

    assert_eq!("my/Minimal", class_file.class_name());
    assert_eq!(Some("java/lang/Object"), class_file.super_class());
    assert_eq!(52, class_file.version.major);
    assert_eq!(AccessFlags::PUBLIC | AccessFlags::SUPER, class_file.access_flags);
    assert!(class_file.fields.is_empty());
    assert!(class_file.methods.is_empty());
    assert!(class_file.attributes.is_empty());
}

#[test]
fn it_should_allow_object_without_a_super_class() {
    let class_file = parse(&ClassBuilder::new("java/lang/Object").build()).unwrap();

    assert_eq!(None, class_file.super_class());
}

#[test]
fn it_should_require_a_super_class_for_other_classes() {
    let mut builder = ClassBuilder::new("my/Orphan");
    builder.super_class = 0;

    assert_eq!(
        "Invalid superclass index 0",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_apply_each_version_rule_at_its_boundaries() {
    let accepts = |java: u16, preview: bool, major: u16, minor: u16| {
        let mut builder = ClassBuilder::with_version("my/Versioned", major);
        builder.minor = minor;
        let options = ParserOptions::new()
            .with_java_version(JavaVersion(java))
            .with_preview_enabled(preview);
        parse_with(&builder.build(), &options).is_ok()
    };

    // Up to Java 8 any minor below the ceiling is fine.
    assert!(accepts(8, false, 52, 0));
    assert!(accepts(8, false, 51, 3));
    assert!(!accepts(8, false, 52, 1));
    assert!(!accepts(8, false, 53, 0));

    // Up to Java 11 only 45 keeps arbitrary minors.
    assert!(accepts(11, false, 55, 65535));
    assert!(accepts(11, false, 45, 3));
    assert!(!accepts(11, false, 50, 1));
    assert!(!accepts(11, false, 56, 0));

    // From Java 12 on, preview minors need the preview switch.
    assert!(accepts(17, false, 56, 0));
    assert!(!accepts(17, false, 56, 1));
    assert!(!accepts(17, false, 61, 65535));
    assert!(accepts(17, true, 61, 65535));
    assert!(!accepts(17, true, 60, 65535));
}

#[test]
fn it_should_report_unsupported_versions() {
    let error = parse(&ClassBuilder::with_version("my/Future", 70).build()).unwrap_err();

    assert_eq!(ClassFileError::UnsupportedVersion { major: 70, minor: 0 }, error);
    assert_eq!(ErrorKind::UnsupportedVersion, error.kind());
}

#[test]
fn it_should_keep_the_raw_constant_pool_bytes() {
    let mut builder = ClassBuilder::new("my/Constants");
    builder.integer(-7);
    builder.float(1.5);
    builder.long(1 << 40);
    builder.double(-0.25);
    builder.string("caf\u{e9} \u{0} \u{1F600}");
    let bytes = builder.build();

    let class_file = parse(&bytes).unwrap();
    let pool = &class_file.constant_pool;

    assert_eq!(&bytes[10..10 + pool.raw_len()], pool.raw_bytes());
    assert_eq!(pool.raw_bytes(), &pool.to_raw_bytes()[..]);
}

#[test]
fn it_should_parse_the_same_bytes_to_equal_artifacts() {
    let mut builder = ClassBuilder::new("my/Twice");
    builder.float(f32::NAN);
    builder.double(f64::NAN);
    builder.field(PRIVATE, "count", "I", &[]);
    builder.simple_method(PUBLIC, "run", "()V");
    let bytes = builder.build();

    let first = parse(&bytes).unwrap();
    let second = parse(&bytes).unwrap();

    assert_eq!(first, second);
}

#[test]
fn it_should_keep_string_constants_with_unpaired_surrogates() {
    let mut builder = ClassBuilder::new("my/Surrogate");
    let lone_high_surrogate = builder.entry(&[1, 0, 3, 0xed, 0xa0, 0x80], 1);
    builder.entry(&[&[8][..], &lone_high_surrogate.to_be_bytes()].concat(), 1);
    let bytes = builder.build();

    let class_file = parse(&bytes).unwrap();
    let pool = &class_file.constant_pool;

    assert_eq!(Tag::Utf8, pool.tag_at(lone_high_surrogate));
    assert_eq!(&[0xed, 0xa0, 0x80][..], &pool.utf8_bytes_at(lone_high_surrogate).unwrap()[..]);
    assert_eq!(pool.raw_bytes(), &pool.to_raw_bytes()[..]);
    assert_eq!(class_file, parse(&bytes).unwrap());
}

#[test]
fn it_should_not_use_unpaired_surrogates_as_names() {
    let mut builder = ClassBuilder::new("my/SurrogateName");
    let name = builder.entry(&[1, 0, 3, 0xed, 0xa0, 0x80], 1);
    let descriptor = builder.utf8("I");
    builder
        .fields
        .push([u16s(&[PRIVATE, name, descriptor]), u16s(&[0])].concat());

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::InvalidConstant, error.kind());
}

#[test]
fn it_should_reject_malformed_utf8_constants() {
    let mut builder = ClassBuilder::new("my/Malformed");
    builder.entry(&[1, 0, 2, b'a', 0x80], 1);

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::InvalidConstant, error.kind());
}

#[test]
fn it_should_reject_duplicate_methods() {
    let mut builder = ClassBuilder::new("my/Duplicates");
    builder.simple_method(PUBLIC, "run", "()V");
    builder.simple_method(PRIVATE | STATIC, "run", "()V");

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::StructuralViolation, error.kind());
    assert_eq!(
        "Duplicate method name and signature: run ()V",
        error.to_string()
    );
}

#[test]
fn it_should_reject_duplicate_fields() {
    let mut builder = ClassBuilder::new("my/Duplicates");
    builder.field(PRIVATE, "count", "I", &[]);
    builder.field(PUBLIC, "count", "I", &[]);

    assert_eq!(
        ErrorKind::StructuralViolation,
        parse(&builder.build()).unwrap_err().kind()
    );
}

#[test]
fn it_should_drop_cyclic_inner_classes() {
    let mut builder = ClassBuilder::new("my/Outer");
    let a = builder.class("my/Outer$A");
    let b = builder.class("my/Outer$B");
    let a_name = builder.utf8("A");
    let b_name = builder.utf8("B");
    let info = u16s(&[2, a, b, a_name, PUBLIC, b, a, b_name, PUBLIC]);
    builder.class_attribute("InnerClasses", &info);

    let class_file = parse(&builder.build()).unwrap();

    assert_eq!(
        Some(&Attribute::InnerClasses(Vec::new())),
        class_file.attributes.find_by_name("InnerClasses")
    );
}

#[test]
fn it_should_drop_inner_classes_listed_twice_by_name() {
    let mut builder = ClassBuilder::new("my/Outer");
    let outer = builder.this_class;
    let first = builder.class("my/Outer$A");
    let second = builder.class("my/Outer$A");
    let name = builder.utf8("A");
    let info = u16s(&[2, first, outer, name, PUBLIC, second, 0, name, PUBLIC]);
    builder.class_attribute("InnerClasses", &info);

    let class_file = parse(&builder.build()).unwrap();

    assert_eq!(
        Some(&Attribute::InnerClasses(Vec::new())),
        class_file.attributes.find_by_name("InnerClasses")
    );
}

#[test]
fn it_should_keep_well_formed_inner_classes() {
    let mut builder = ClassBuilder::new("my/Outer");
    let outer = builder.this_class;
    let inner = builder.class("my/Outer$Inner");
    let name = builder.utf8("Inner");
    builder.class_attribute("InnerClasses", &u16s(&[1, inner, outer, name, PUBLIC | STATIC]));

    let class_file = parse(&builder.build()).unwrap();

    match class_file.attributes.find_by_name("InnerClasses") {
        Some(Attribute::InnerClasses(entries)) => {
            assert_eq!(1, entries.len());
            assert_eq!(inner, entries[0].inner_class_index);
            assert_eq!(AccessFlags::PUBLIC | AccessFlags::STATIC, entries[0].access_flags);
        }
        other => panic!("unexpected attribute {:?}", other),
    }
}

#[test]
fn it_should_reject_a_class_that_is_its_own_outer_class() {
    let mut builder = ClassBuilder::new("my/Outer");
    let inner = builder.class("my/Outer$Inner");
    let name = builder.utf8("Inner");
    builder.class_attribute("InnerClasses", &u16s(&[1, inner, inner, name, PUBLIC]));

    assert_eq!(
        "Class is both outer and inner class",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_reject_mismatched_constant_values() {
    let mut builder = ClassBuilder::new("my/Constants");
    let value = builder.double(2.0);
    let constant_value = builder.attribute("ConstantValue", &u16s(&[value]));
    builder.field(PUBLIC | STATIC | FINAL, "COUNT", "I", &[constant_value]);

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::StructuralViolation, error.kind());
    match error {
        ClassFileError::InvalidConstantValue { field, .. } => assert_eq!("COUNT", field),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn it_should_accept_matching_constant_values() {
    let mut builder = ClassBuilder::new("my/Constants");
    let value = builder.integer(3);
    let constant_value = builder.attribute("ConstantValue", &u16s(&[value]));
    builder.field(PUBLIC | STATIC | FINAL, "COUNT", "I", &[constant_value]);

    let class_file = parse(&builder.build()).unwrap();

    assert_eq!(Some(value), class_file.fields[0].constant_value_index());
}

#[test]
fn it_should_leave_the_slot_after_a_long_unusable() {
    let mut builder = ClassBuilder::new("my/Wide");
    let long = builder.long(42);
    let class_file = parse(&builder.build()).unwrap();
    let pool = &class_file.constant_pool;

    assert_eq!(Ok(42), pool.long_at(long));
    assert_eq!(Tag::Invalid, pool.tag_at(long + 1));
    assert!(pool.long_at(long + 1).is_err());
    assert!(pool.utf8_at(long + 1).is_err());
}

#[test]
fn it_should_reject_a_long_in_the_last_pool_slot() {
    #[rustfmt::skip]
    let bytes = [
        0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 52,
        0, 2,
        5, 0, 0, 0, 0, 0, 0, 0, 1,
    ];

    let error = parse(&bytes).unwrap_err();

    assert_eq!(ErrorKind::InvalidConstant, error.kind());
    assert_eq!("Invalid long constant index 1", error.to_string());
}

#[test]
fn it_should_limit_argument_slots() {
    let wide_arguments = format!("({}I)V", "J".repeat(127));

    let mut builder = ClassBuilder::new("my/Arguments");
    builder.simple_method(PUBLIC | STATIC, "call", &wide_arguments);
    assert!(parse(&builder.build()).is_ok());

    let mut builder = ClassBuilder::new("my/Arguments");
    builder.simple_method(PUBLIC, "call", &wide_arguments);
    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::StructuralViolation, error.kind());
}

#[test]
fn it_should_report_a_name_mismatch() {
    let bytes = ClassBuilder::new("my/Actual").build();

    let error = parse_with(&bytes, &ParserOptions::new().with_requested_name("my/Expected"))
        .unwrap_err();

    assert_eq!(ErrorKind::NameMismatch, error.kind());
    assert_eq!(
        ClassFileError::NameMismatch {
            expected: "my/Expected".to_owned(),
            found: "my/Actual".to_owned(),
        },
        error
    );
}

#[test]
fn it_should_not_check_the_name_of_hidden_classes() {
    let mut builder = ClassBuilder::new("my/Actual");
    builder.simple_method(PUBLIC, "run", "()V");
    let options = ParserOptions::new()
        .with_requested_name("my/Expected")
        .with_hidden(true);

    let class_file = parse_with(&builder.build(), &options).unwrap();

    assert!(class_file.methods[0].access_flags.contains(AccessFlags::HIDDEN));
}

#[test]
fn it_should_reject_modules() {
    let mut builder = ClassBuilder::with_version("module-info", 53);
    builder.access_flags = 0x8000;
    builder.super_class = 0;

    let error = parse_with(&builder.build(), &ParserOptions::new().with_requested_name("module-info"))
        .unwrap_err();

    assert_eq!(ErrorKind::NotAClass, error.kind());
}

#[test]
fn it_should_report_module_constants_in_classes() {
    let mut builder = ClassBuilder::with_version("my/NotAModule", 53);
    let name = builder.utf8("my.module");
    builder.entry(&[&[19][..], &name.to_be_bytes()].concat(), 1);

    assert_eq!(
        "Unknown constant tag 19",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_report_modules_before_module_constants() {
    let mut builder = ClassBuilder::with_version("module-info", 53);
    builder.access_flags = 0x8000;
    builder.super_class = 0;
    let name = builder.utf8("my.module");
    builder.entry(&[&[19][..], &name.to_be_bytes()].concat(), 1);

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::NotAClass, error.kind());
}

#[test]
fn it_should_reject_constant_tags_newer_than_the_class_file() {
    let mut builder = ClassBuilder::with_version("my/TooOld", 50);
    builder.invoke_dynamic(0, "run", "()V");

    let error = parse(&builder.build()).unwrap_err();

    assert_eq!(ErrorKind::InvalidConstant, error.kind());
    assert_eq!(
        ClassFileError::InvalidConstant(
            "Class file version does not support constant tag 18 in class file".to_string()
        ),
        error
    );
}

#[test]
fn it_should_skip_deeply_nested_annotation_values() {
    let mut builder = ClassBuilder::new("my/Nested");
    let value_based = builder.utf8("Ljdk/internal/ValueBased;");
    let value = builder.utf8("value");
    let int_value = builder.integer(1);
    let mut info = u16s(&[1, value_based, 1, value]);
    for _ in 0..500_000 {
        info.extend_from_slice(&[b'[', 0, 1]);
    }
    info.push(b'I');
    info.extend_from_slice(&int_value.to_be_bytes());
    builder.class_attribute("RuntimeVisibleAnnotations", &info);
    let bytes = builder.build();

    let boot = ParserOptions::new().with_loader_is_boot_or_platform(true);
    let class_file = parse_with(&bytes, &boot).unwrap();
    assert!(class_file.access_flags.contains(AccessFlags::VALUE_BASED));

    let mut truncated_info = info;
    truncated_info.truncate(truncated_info.len() - 3);
    let mut builder = ClassBuilder::new("my/Nested");
    builder.utf8("Ljdk/internal/ValueBased;");
    builder.class_attribute("RuntimeVisibleAnnotations", &truncated_info);
    let error = parse_with(&builder.build(), &boot).unwrap_err();
    assert_eq!(ErrorKind::MalformedInput, error.kind());
}

#[test]
fn it_should_reject_bad_magic() {
    let mut bytes = ClassBuilder::new("my/Magic").build();
    bytes[3] = 0xbf;

    let error = parse(&bytes).unwrap_err();

    assert_eq!(ClassFileError::InvalidMagicIdentifier(0xCAFEBABF), error);
    assert_eq!(ErrorKind::MalformedInput, error.kind());
}

#[test]
fn it_should_reject_trailing_bytes() {
    let mut bytes = ClassBuilder::new("my/Trailing").build();
    bytes.push(0);

    assert_eq!(ClassFileError::TrailingBytes(1), parse(&bytes).unwrap_err());
}

#[test]
fn it_should_reject_truncated_input() {
    let bytes = ClassBuilder::new("my/Truncated").build();

    let error = parse(&bytes[..bytes.len() - 1]).unwrap_err();

    assert_eq!(ErrorKind::MalformedInput, error.kind());
}

#[test]
fn it_should_check_attribute_lengths() {
    let mut builder = ClassBuilder::new("my/Lengths");
    let source = builder.utf8("Lengths.java");
    let attribute = builder.attribute_with_length("SourceFile", &[&source.to_be_bytes()[..], &[0]].concat(), 3);
    builder.attributes.push(attribute);

    assert_eq!(
        ClassFileError::InvalidAttributeLength {
            name: "SourceFile".to_owned(),
            reported: 3,
            parsed: 2,
        },
        parse(&builder.build()).unwrap_err()
    );
}

#[test]
fn it_should_peek_the_class_name() {
    let bytes = ClassBuilder::new("my/Peeked").build();

    let name = ClassFile::peek_name(&bytes, &ParserOptions::default(), &SymbolTable::new()).unwrap();

    assert_eq!("my/Peeked", name.as_str());
}

#[test]
fn it_should_parse_code_attributes() {
    let mut builder = ClassBuilder::new("my/Code");
    let exception = builder.class("java/lang/Exception");
    let line_numbers = builder.attribute("LineNumberTable", &u16s(&[1, 0, 7]));
    let this = builder.utf8("this");
    let descriptor = builder.utf8("Lmy/Code;");
    let locals = builder.attribute("LocalVariableTable", &u16s(&[1, 0, 1, this, descriptor, 0]));
    let code = builder.code(1, &[[0, 1, 0, exception]], &[line_numbers, locals]);
    builder.method(PUBLIC, "run", "()V", &[code]);

    let class_file = parse(&builder.build()).unwrap();
    let code = class_file.methods[0].code().unwrap();

    assert_eq!(vec![0xb1], code.code);
    assert_eq!(1, code.line_numbers().len());
    assert_eq!(7, code.line_numbers()[0].line_number);
    assert_eq!(
        Some("java/lang/Exception"),
        code.exception_table[0].catch_type_name.as_deref()
    );
    assert_eq!(vec!["this"], code.local_variables().map(|l| l.name.as_str()).collect::<Vec<_>>());
}

#[test]
fn it_should_reject_unmatched_local_variable_types() {
    let mut builder = ClassBuilder::new("my/Generic");
    let this = builder.utf8("this");
    let descriptor = builder.utf8("Lmy/Generic;");
    let signature = builder.utf8("Lmy/Generic<TT;>;");
    let locals = builder.attribute("LocalVariableTable", &u16s(&[1, 0, 1, this, descriptor, 0]));
    let types = builder.attribute("LocalVariableTypeTable", &u16s(&[1, 0, 1, this, signature, 1]));
    let code = builder.code(2, &[], &[locals, types]);
    builder.method(PUBLIC, "run", "()V", &[code]);

    assert!(class_format_message(parse(&builder.build()))
        .contains("does not match any local variable table entry"));
}

#[test]
fn it_should_require_code_on_concrete_methods() {
    let mut builder = ClassBuilder::new("my/NoCode");
    builder.method(PUBLIC, "run", "()V", &[]);

    assert_eq!(
        "Missing Code attribute",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_reject_a_missing_bootstrap_methods_attribute() {
    let mut builder = ClassBuilder::new("my/Indy");
    builder.invoke_dynamic(0, "run", "()Ljava/lang/Runnable;");

    assert_eq!(
        "BootstrapMethods attribute is missing",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_reject_both_nest_attributes() {
    let mut builder = ClassBuilder::with_version("my/Nested", 55);
    let host = builder.class("my/Host");
    builder.class_attribute("NestHost", &u16s(&[host]));
    builder.class_attribute("NestMembers", &u16s(&[1, host]));

    assert_eq!(
        "Classfile cannot have both a nest members and a nest host attribute.",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_reject_permitted_subclasses_on_final_classes() {
    let mut builder = ClassBuilder::with_version("my/Sealed", 61);
    builder.access_flags |= FINAL;
    let sub = builder.class("my/Sub");
    builder.class_attribute("PermittedSubclasses", &u16s(&[1, sub]));

    assert_eq!(
        "A final class may not declare a permitted subclasses attribute.",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_keep_newer_attributes_raw_in_old_class_files() {
    let mut builder = ClassBuilder::with_version("my/Old", 48);
    let host = builder.class("my/Host");
    builder.class_attribute("NestHost", &u16s(&[host]));

    let class_file = parse(&builder.build()).unwrap();

    assert!(matches!(
        class_file.attributes.find_by_name("NestHost"),
        Some(Attribute::Raw(_))
    ));
}

#[test]
fn it_should_read_source_attributes() {
    let mut builder = ClassBuilder::new("my/Sources");
    let source = builder.utf8("Sources.java");
    builder.class_attribute("SourceFile", &u16s(&[source]));
    builder.class_attribute("SourceDebugExtension", b"SMAP\n");
    builder.class_attribute("Synthetic", &[]);

    let class_file = parse(&builder.build()).unwrap();

    assert_eq!(Some("Sources.java"), class_file.source_file());
    assert_eq!(
        Some(&Attribute::SourceDebugExtension(Some("SMAP\n".to_owned()))),
        class_file.attributes.find_by_name("SourceDebugExtension")
    );
    assert!(class_file.access_flags.contains(AccessFlags::SYNTHETIC));
}

#[test]
fn it_should_reject_duplicate_source_files() {
    let mut builder = ClassBuilder::new("my/Sources");
    let source = builder.utf8("Sources.java");
    builder.class_attribute("SourceFile", &u16s(&[source]));
    builder.class_attribute("SourceFile", &u16s(&[source]));

    assert_eq!(
        "Duplicate SourceFile attribute",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_require_static_class_initializers() {
    let mut builder = ClassBuilder::new("my/Init");
    builder.simple_method(0, "<clinit>", "()V");

    assert_eq!(
        ClassFileError::MethodNotStatic,
        parse(&builder.build()).unwrap_err()
    );
}

#[test]
fn it_should_detect_finalizers() {
    let mut builder = ClassBuilder::new("my/Finalized");
    builder.simple_method(PUBLIC, "finalize", "()V");

    assert!(parse(&builder.build()).unwrap().has_finalizer());
    assert!(!parse(&ClassBuilder::new("my/Plain").build()).unwrap().has_finalizer());
}

#[test]
fn it_should_reject_duplicate_interfaces() {
    let mut builder = ClassBuilder::new("my/Runner");
    let runnable = builder.class("java/lang/Runnable");
    builder.interfaces = vec![runnable, runnable];

    assert_eq!(
        "Duplicate interface name in classfile: java/lang/Runnable",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_reject_void_fields() {
    let mut builder = ClassBuilder::new("my/Void");
    builder.field(PRIVATE, "nothing", "V", &[]);

    assert_eq!(
        "Fields cannot be of type void",
        class_format_message(parse(&builder.build()))
    );
}

#[test]
fn it_should_find_members_by_name_and_descriptor() {
    let mut builder = ClassBuilder::new("my/Members");
    builder.field(PRIVATE, "count", "J", &[]);
    builder.simple_method(PUBLIC, "run", "()V");
    builder.simple_method(PUBLIC, "run", "(I)V");

    let class_file = parse(&builder.build()).unwrap();

    let field = class_file.find_field("count", "J").unwrap();
    assert_eq!(classcheck_symbols::JavaKind::Long, field.kind);
    assert!(class_file.find_method("run", "(I)V").unwrap().code().is_some());
    assert!(class_file.find_method("run", "(J)V").is_none());
}
