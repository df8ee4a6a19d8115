//! End-to-end tests: source text through lexer, parser and resolver to IR

use indoc::indoc;
use xfile_frontend::{
    AddrDirection, AddrVal, ArrayCount, BasicType, EnumValue, Frontend, IrDecl, ResolvedType,
    SizeVal,
};

fn resolve(source: &str) -> xfile_frontend::ResolvedUnit {
    Frontend::resolve_source(source).expect("source should lex and parse")
}

fn get_struct<'a>(resolved: &'a xfile_frontend::ResolvedUnit, name: &str) -> &'a xfile_frontend::IrStruct {
    match resolved.table.get(name) {
        Some(IrDecl::Struct(decl)) => decl,
        other => panic!("expected struct {name}, got {other:?}"),
    }
}

#[test]
fn test_sequential_layout_offsets() {
    let resolved = resolve(indoc! {"
        struct TableRecord {
            Char tag[4]
            Uint32 checksum
            Uint32 offset
            Uint32 length
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "TableRecord");

    assert_eq!(decl.size, SizeVal::Known(16));
    assert_eq!(decl.members[0].offset, SizeVal::Known(0));
    assert_eq!(decl.members[0].size, SizeVal::Known(4));
    assert_eq!(decl.members[1].offset, SizeVal::Known(4));
    assert_eq!(decl.members[2].offset, SizeVal::Known(8));
    assert_eq!(decl.members[3].offset, SizeVal::Known(12));
}

#[test]
fn test_dynamic_array_makes_following_offsets_dynamic() {
    let resolved = resolve(indoc! {"
        struct Name {
            Uint16 count
            Uint16 records[count]
            Uint32 trailer
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "Name");

    assert!(matches!(decl.members[1].count, ArrayCount::Dynamic(_)));
    assert_eq!(decl.members[1].offset, SizeVal::Known(2));
    assert_eq!(decl.members[1].size, SizeVal::Dynamic);
    assert_eq!(decl.members[2].offset, SizeVal::Dynamic);
    assert_eq!(decl.size, SizeVal::Dynamic);
}

#[test]
fn test_absolute_address_pins_offset_after_dynamic_member() {
    let resolved = resolve(indoc! {"
        struct S {
            CStr name
            Uint32 fixed (+ 64)
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "S");

    assert_eq!(decl.members[0].size, SizeVal::Dynamic);
    assert_eq!(decl.members[1].offset, SizeVal::Known(64));
    assert_eq!(decl.size, SizeVal::Dynamic);
}

#[test]
fn test_addr_directive_flags() {
    let resolved = resolve(indoc! {"
        struct S {
            Uint32 a
            Uint8 b (+ 16)
            Uint8 c ($- 2)
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "S");

    let b = decl.members[1].addr.as_ref().unwrap();
    assert!(!b.cursor_relative);
    assert_eq!(b.direction, AddrDirection::Forward);
    assert_eq!(b.magnitude, AddrVal::Known(16));
    assert_eq!(decl.members[1].offset, SizeVal::Known(16));

    // Cursor after b sits at 17; $- 2 moves it back to 15
    let c = decl.members[2].addr.as_ref().unwrap();
    assert!(c.cursor_relative);
    assert_eq!(c.direction, AddrDirection::Backward);
    assert_eq!(decl.members[2].offset, SizeVal::Known(15));
}

#[test]
fn test_negative_absolute_address_rejected() {
    let resolved = resolve("struct S { Uint8 a (- 4) }");
    assert!(!resolved.is_clean());
    assert!(resolved.table.get("S").is_none());
}

#[test]
fn test_implicit_members_appended_in_order() {
    let resolved = resolve(indoc! {"
        struct S {
            Uint16 version
            #implicit {
                Uint16 checksum
                Uint16 padding
            }
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "S");

    assert_eq!(decl.members.len(), 3);
    assert!(!decl.members[0].implicit);
    assert_eq!(decl.members[1].name, "checksum");
    assert!(decl.members[1].implicit);
    assert_eq!(decl.members[2].name, "padding");
    assert!(decl.members[2].implicit);
    assert_eq!(decl.members[2].offset, SizeVal::Known(4));
    assert_eq!(decl.size, SizeVal::Known(6));
}

#[test]
fn test_asserts_retained_verbatim() {
    let resolved = resolve(indoc! {"
        struct Head {
            Uint32 magic
            Uint16 units_per_em
            #assert {
                magic == 0x5f0f3cf5
                units_per_em >= 16 && units_per_em <= 16384
            }
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "Head");
    assert_eq!(decl.asserts.len(), 2);
}

#[test]
fn test_enum_aliases_and_ranges() {
    let resolved = resolve(indoc! {"
        enum Version : Uint16 {
            V1, TrueType = 1
            Reserved = 2..255
        }
    "});

    assert!(resolved.is_clean());
    match resolved.table.get("Version") {
        Some(IrDecl::Enum(decl)) => {
            assert_eq!(decl.underlying, BasicType::Uint16);
            assert_eq!(decl.members[0].names, vec!["V1", "TrueType"]);
            assert_eq!(decl.members[0].value, EnumValue::Num(1));
            assert_eq!(decl.members[1].value, EnumValue::Range { begin: 2, end: 255 });
        }
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn test_duplicate_enum_member_rejected() {
    let resolved = resolve("enum E : Uint8 { A = 1 A = 2 }");
    assert!(!resolved.is_clean());
    assert!(resolved.table.get("E").is_none());
}

#[test]
fn test_backwards_range_rejected() {
    let resolved = resolve("enum E : Uint8 { A = 10..1 }");
    assert!(!resolved.is_clean());
}

#[test]
fn test_range_as_array_size_rejected() {
    let resolved = resolve("struct S { Uint8 data[1..10] }");
    assert!(!resolved.is_clean());
    assert!(resolved.table.get("S").is_none());
}

#[test]
fn test_enum_member_type_resolves() {
    let resolved = resolve(indoc! {"
        enum Platform : Uint16 {
            Unicode = 0
            Windows = 3
        }
        struct NameRecord {
            Platform platform_id
            Uint16 name_id
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "NameRecord");

    assert_eq!(decl.members[0].ty, ResolvedType::Enum { name: "Platform".to_string() });
    // Enum members take their underlying type's size
    assert_eq!(decl.members[0].size, SizeVal::Known(2));
    assert_eq!(decl.size, SizeVal::Known(4));
}

#[test]
fn test_nested_struct_sizes() {
    let resolved = resolve(indoc! {"
        struct Inner {
            Uint32 a
            Uint32 b
        }
        struct Outer {
            Inner pair
            Uint8 tail
        }
    "});

    assert!(resolved.is_clean());
    let outer = get_struct(&resolved, "Outer");

    assert_eq!(outer.members[0].size, SizeVal::Known(8));
    assert_eq!(outer.members[1].offset, SizeVal::Known(8));
    assert_eq!(outer.size, SizeVal::Known(9));
}

#[test]
fn test_forward_reference_resolves() {
    let resolved = resolve(indoc! {"
        struct Outer {
            Inner pair
        }
        struct Inner {
            Uint32 a
        }
    "});

    assert!(resolved.is_clean());
    assert_eq!(get_struct(&resolved, "Outer").size, SizeVal::Known(4));
}

#[test]
fn test_pointer_members() {
    let resolved = resolve("struct S { Uint8** table Uint8 tail }");

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "S");

    assert_eq!(format!("{}", decl.members[0].ty), "Uint8**");
    assert_eq!(decl.members[0].size, SizeVal::Known(8));
    assert_eq!(decl.members[1].offset, SizeVal::Known(8));
}

#[test]
fn test_pointer_breaks_struct_recursion() {
    let resolved = resolve(indoc! {"
        struct Node {
            Uint32 value
            Node* next
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "Node");
    assert_eq!(decl.size, SizeVal::Known(12));
}

#[test]
fn test_direct_struct_recursion_rejected() {
    let resolved = resolve("struct Node { Uint32 value Node next }");
    assert!(!resolved.is_clean());
    assert!(resolved.table.get("Node").is_none());
}

#[test]
fn test_typedef_instantiation() {
    let resolved = resolve(indoc! {"
        typedef Entry<K, V> {
            key: K
            value: V
        }
        struct Map {
            Uint16 count
            Entry<Uint32, Uint64> entries[4]
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "Map");

    match &decl.members[1].ty {
        ResolvedType::Instance { typedef, args } => {
            assert_eq!(typedef, "Entry");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected instance, got {other:?}"),
    }
    // Each entry is 4 + 8 bytes
    assert_eq!(decl.members[1].size, SizeVal::Known(48));
    assert_eq!(decl.size, SizeVal::Known(50));
}

#[test]
fn test_typedef_arity_mismatch() {
    let resolved = resolve(indoc! {"
        typedef Entry<K, V> {
            key: K
            value: V
        }
        struct Map {
            Entry<Uint32> entries[4]
        }
    "});

    assert!(!resolved.is_clean());
    assert!(resolved.table.get("Map").is_none());
    // The typedef itself is fine
    assert!(resolved.table.get("Entry").is_some());
}

#[test]
fn test_cyclic_typedefs_rejected() {
    let resolved = resolve(indoc! {"
        typedef A<T> { x: B }
        typedef B<T> { y: A }
        struct Ok { Uint8 z }
    "});

    assert!(!resolved.is_clean());
    assert!(resolved.table.get("A").is_none());
    assert!(resolved.table.get("B").is_none());
    assert!(resolved.table.get("Ok").is_some());
    assert_eq!(resolved.errors.len(), 2);
}

#[test]
fn test_undefined_type_reference() {
    let resolved = resolve("struct S { Missing x }");
    assert!(!resolved.is_clean());
    assert!(resolved.errors[0].to_string().contains("Missing"));
}

#[test]
fn test_duplicate_names_across_kinds() {
    let resolved = resolve(indoc! {"
        enum Tag : Uint8 { A = 1 }
        struct Tag { Uint8 x }
    "});

    assert!(!resolved.is_clean());
    assert!(matches!(resolved.table.get("Tag"), Some(IrDecl::Enum(_))));
}

#[test]
fn test_file_layout() {
    let resolved = resolve(indoc! {"
        struct TableRecord {
            Char tag[4]
            Uint32 checksum
            Uint32 offset
            Uint32 length
        }
        file FontFile {
            Uint32 sfnt_version
            Uint16 num_tables
            TableRecord records[num_tables]
        }
    "});

    assert!(resolved.is_clean());
    match resolved.table.get("FontFile") {
        Some(IrDecl::File(decl)) => {
            assert_eq!(decl.members.len(), 3);
            assert_eq!(decl.members[2].offset, SizeVal::Known(6));
            assert!(matches!(decl.members[2].count, ArrayCount::Dynamic(_)));
            assert_eq!(decl.size, SizeVal::Dynamic);
        }
        other => panic!("expected file, got {other:?}"),
    }
}

#[test]
fn test_file_not_usable_as_member_type() {
    let resolved = resolve(indoc! {"
        file F { Uint8 a }
        struct S { F inner }
    "});

    assert!(!resolved.is_clean());
    assert!(resolved.table.get("S").is_none());
    assert!(resolved.table.get("F").is_some());
}

#[test]
fn test_doc_strings_flow_into_ir() {
    let resolved = resolve(indoc! {"
        /* The font header table. */
        struct Head {
            Uint32 magic /* must equal the head table magic */
        }
    "});

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "Head");
    assert_eq!(decl.doc.as_deref(), Some(" The font header table. "));
    assert_eq!(decl.members[0].doc.as_deref(), Some(" must equal the head table magic "));
}

#[test]
fn test_iteration_preserves_source_order() {
    let resolved = resolve(indoc! {"
        struct B { Uint8 x }
        struct A { Uint8 y }
        enum C : Uint8 { V = 1 }
    "});

    let names: Vec<&str> = resolved.table.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["B", "A", "C"]);
}

#[test]
fn test_constant_folded_array_size() {
    let resolved = resolve("struct S { Uint8 window[1 << 4] }");

    assert!(resolved.is_clean());
    let decl = get_struct(&resolved, "S");
    assert_eq!(decl.members[0].count, ArrayCount::Fixed(16));
    assert_eq!(decl.size, SizeVal::Known(16));
}

#[test]
fn test_division_by_zero_in_array_size() {
    let resolved = resolve("struct S { Uint8 data[4 / 0] }");
    assert!(!resolved.is_clean());
}
