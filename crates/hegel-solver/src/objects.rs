//! Property lookup on structural types.
//!
//! Objects without the property defer to their `is_subtype_of` supertype;
//! applications are expanded; intersections take the first member that has
//! it; unions require every member to have it.

use crate::arena::TypeArena;
use crate::instantiate::resolve_application;
use crate::types::*;
use hegel_common::limits::MAX_SUBTYPE_DEPTH;
use indexmap::IndexMap;

pub fn find_property(arena: &mut TypeArena, ty: TypeId, name: &str) -> Option<PropertyInfo> {
    find_property_at(arena, ty, name, 0)
}

fn find_property_at(
    arena: &mut TypeArena,
    ty: TypeId,
    name: &str,
    depth: u32,
) -> Option<PropertyInfo> {
    if depth >= MAX_SUBTYPE_DEPTH {
        return None;
    }
    let ty = resolve_application(arena, ty);
    match arena.data(ty) {
        TypeData::Object(shape) => {
            if let Some(property) = shape.properties.get(name) {
                return Some(property.clone());
            }
            let parent = arena.get(ty).is_subtype_of?;
            find_property_at(arena, parent, name, depth + 1)
        }
        TypeData::Intersection(members) => {
            let members = members.clone();
            members
                .into_iter()
                .find_map(|member| find_property_at(arena, member, name, depth + 1))
        }
        TypeData::Union(members) => {
            let members = members.clone();
            let parent = arena.get(ty).parent;
            let mut types = Vec::with_capacity(members.len());
            let mut optional = false;
            for member in members {
                let property = find_property_at(arena, member, name, depth + 1)?;
                optional |= property.optional;
                types.push(property.ty);
            }
            Some(PropertyInfo {
                ty: arena.union(types, parent),
                optional,
            })
        }
        TypeData::Parameter(info) => {
            let constraint = info.constraint?;
            find_property_at(arena, constraint, name, depth + 1)
        }
        _ => None,
    }
}

/// Every property visible on `ty`, own properties shadowing inherited ones,
/// in declaration order (supertype first).
pub fn collect_properties(arena: &mut TypeArena, ty: TypeId) -> IndexMap<String, PropertyInfo> {
    let mut out = IndexMap::new();
    collect_into(arena, ty, &mut out, 0);
    out
}

fn collect_into(
    arena: &mut TypeArena,
    ty: TypeId,
    out: &mut IndexMap<String, PropertyInfo>,
    depth: u32,
) {
    if depth >= MAX_SUBTYPE_DEPTH {
        return;
    }
    let ty = resolve_application(arena, ty);
    match arena.data(ty) {
        TypeData::Object(shape) => {
            let own = shape.properties.clone();
            if let Some(parent) = arena.get(ty).is_subtype_of {
                collect_into(arena, parent, out, depth + 1);
            }
            out.extend(own);
        }
        TypeData::Intersection(members) => {
            for member in members.clone() {
                collect_into(arena, member, out, depth + 1);
            }
        }
        TypeData::Union(members) => {
            let members = members.clone();
            let Some((&first, rest)) = members.split_first() else {
                return;
            };
            let mut common = IndexMap::new();
            collect_into(arena, first, &mut common, depth + 1);
            for &member in rest {
                let mut other = IndexMap::new();
                collect_into(arena, member, &mut other, depth + 1);
                common.retain(|key, _| other.contains_key(key));
            }
            for key in common.keys().cloned().collect::<Vec<_>>() {
                if let Some(property) = find_property_at(arena, ty, &key, depth + 1) {
                    out.insert(key, property);
                }
            }
        }
        TypeData::Parameter(info) => {
            if let Some(constraint) = info.constraint {
                collect_into(arena, constraint, out, depth + 1);
            }
        }
        _ => {}
    }
}

/// Name of the class that supplies members of a primitive value.
pub fn wrapper_class_name(arena: &TypeArena, ty: TypeId) -> Option<&'static str> {
    let primitive = match arena.data(ty) {
        TypeData::Literal(value) => value.widened(),
        TypeData::Primitive(_) => ty,
        _ => return None,
    };
    match primitive {
        TypeId::NUMBER => Some("Number"),
        TypeId::STRING => Some("String"),
        TypeId::BOOLEAN => Some("Boolean"),
        TypeId::BIGINT => Some("BigInt"),
        TypeId::SYMBOL => Some("Symbol"),
        _ => None,
    }
}
