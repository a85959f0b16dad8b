use p4_ir::Ir;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn records_and_clears_node_facts() {
    let mut ir = Ir::new();
    let x = ir.path("x");
    let one = ir.int(1);
    let mut map = TypeMap::new();
    let b8 = map.pool_mut().bits(8, false);

    assert_eq!(map.set_type(x, b8), None);
    map.set_left_value(x);
    map.set_type(one, TypeId::INF_INT);
    map.set_compile_time_constant(one);

    assert_eq!(map.get_type(x), Some(b8));
    assert!(map.is_left_value(x));
    assert!(!map.is_left_value(one));
    assert!(map.is_compile_time_constant(one));
    assert_eq!(map.len(), 2);

    map.clear();
    assert!(map.is_empty());
    assert!(!map.is_left_value(x));
    assert_eq!(map.pool_mut().bits(8, false), b8);
}

#[test]
fn copy_entry_transfers_every_fact() {
    let mut ir = Ir::new();
    let call = ir.path("f");
    let copy = ir.path("f");
    let mut map = TypeMap::new();
    map.set_type(call, TypeId::BOOL);
    map.set_compile_time_constant(call);
    map.set_type_args(call, vec![TypeId::STRING]);

    map.copy_entry(call, copy);
    assert_eq!(map.get_type(copy), Some(TypeId::BOOL));
    assert!(map.is_compile_time_constant(copy));
    assert_eq!(map.type_args(copy), Some(&[TypeId::STRING][..]));
    assert!(!map.is_left_value(copy));
}
