//! Partition strategies: material-group, skinned-group and spatial-octant
//! splits.
//!
//! Exactly one strategy fires per mesh, in priority order, and each runs at
//! most once per prepared session (the engine guards the one-shot). A `None`
//! result means the mesh stays whole and explodes as one rigid unit.

use asmview_scene::{
    Aabb, Geometry, GeometryId, Group, MaterialId, MeshData, Node, NodeId, NodeKind, Scene,
    SkinnedMeshData, attribute_names,
};

use crate::extract::{IndexSelection, extract_sub_geometry};
use crate::material::MaterialCache;

/// One part produced by a split: an unattached node plus the id of the
/// geometry created for it (for picking-index builds).
pub(crate) struct Part {
    pub node: Node,
    pub geometry: GeometryId,
}

/// Try to split the mesh at `node_id` into independently movable parts.
///
/// Returns `None` when no strategy applies (instanced meshes, missing
/// position attribute, single-group skinned meshes, or a spatial split that
/// failed to produce at least two buckets).
pub(crate) fn partition_node(
    scene: &mut Scene,
    node_id: NodeId,
    materials: &mut MaterialCache,
) -> Option<Vec<Part>> {
    let node = scene.node(node_id);
    let label = node.name.clone().unwrap_or_else(|| "mesh".to_owned());
    let transform = node.transform;
    let visible = node.visible;

    let (mesh, skin) = match &node.kind {
        NodeKind::Mesh(mesh) => (mesh.clone(), None),
        NodeKind::SkinnedMesh(data) => (data.mesh.clone(), Some((data.skeleton, data.bind_matrix))),
        // Instance transforms are not per-part state; never split.
        NodeKind::InstancedMesh(_) | NodeKind::Group => return None,
    };

    let geometry = scene.geometry(mesh.geometry);
    if !geometry.has_attribute(attribute_names::POSITION) {
        tracing::debug!(mesh = %label, "no position attribute, mesh explodes whole");
        return None;
    }

    let groups = geometry.groups.clone();
    let mut parts = if groups.len() > 1 {
        split_by_groups(scene, &mesh, skin, &groups, materials, &label)
    } else if skin.is_some() {
        // A single-group skinned mesh has no seam we can cut without tearing
        // bone influence ranges apart.
        tracing::debug!(mesh = %label, "single-group skinned mesh kept whole");
        None
    } else {
        split_by_octants(scene, &mesh, &groups, materials, &label)
    }?;

    // Parts stand in for the source at the same spot in the hierarchy, so
    // they carry its local transform and visibility.
    for part in &mut parts {
        part.node.transform = transform;
        part.node.visible = visible;
    }
    Some(parts)
}

/// Strategies 1 and 2: one part per material group. Skinned sources produce
/// skinned parts bound to the same shared skeleton.
fn split_by_groups(
    scene: &mut Scene,
    mesh: &MeshData,
    skin: Option<(asmview_scene::SkeletonId, glam::Mat4)>,
    groups: &[Group],
    materials: &mut MaterialCache,
    label: &str,
) -> Option<Vec<Part>> {
    let mut extractions = Vec::with_capacity(groups.len());
    {
        let source = scene.geometry(mesh.geometry);
        for group in groups {
            let selection = IndexSelection::Range {
                start: group.start,
                count: group.count,
            };
            match extract_sub_geometry(source, selection) {
                Ok(extraction) => extractions.push((extraction.geometry, group.material_index)),
                Err(err) => {
                    tracing::warn!(mesh = %label, %err, "group extraction failed, mesh kept whole");
                    return None;
                }
            }
        }
    }

    let parts = extractions
        .into_iter()
        .enumerate()
        .map(|(i, (geometry, material_index))| {
            build_part(scene, mesh, skin, geometry, material_index, label, i, materials)
        })
        .collect();
    tracing::debug!(mesh = %label, parts = groups.len(), "split by material groups");
    Some(parts)
}

/// Strategy 3: bucket triangles by the sign-octant of their centroid around
/// the geometry's AABB center.
fn split_by_octants(
    scene: &mut Scene,
    mesh: &MeshData,
    groups: &[Group],
    materials: &mut MaterialCache,
    label: &str,
) -> Option<Vec<Part>> {
    let mut extractions = Vec::new();
    {
        let source = scene.geometry(mesh.geometry);
        let buckets = octant_buckets(source);
        let non_empty = buckets.iter().filter(|b| !b.is_empty()).count();
        if non_empty < 2 {
            tracing::debug!(
                mesh = %label,
                buckets = non_empty,
                "spatial split produced fewer than two buckets, mesh kept whole"
            );
            return None;
        }

        for bucket in &buckets {
            if bucket.is_empty() {
                continue;
            }
            match extract_sub_geometry(source, IndexSelection::Indices(bucket)) {
                Ok(extraction) => extractions.push(extraction.geometry),
                Err(err) => {
                    tracing::warn!(mesh = %label, %err, "octant extraction failed, mesh kept whole");
                    return None;
                }
            }
        }
    }

    // The whole source renders with one material slot.
    let material_index = groups.first().map_or(0, |g| g.material_index);
    let count = extractions.len();
    let parts = extractions
        .into_iter()
        .enumerate()
        .map(|(i, geometry)| {
            build_part(scene, mesh, None, geometry, material_index, label, i, materials)
        })
        .collect();
    tracing::debug!(mesh = %label, parts = count, "split by spatial octants");
    Some(parts)
}

/// Classify every triangle's centroid into one of 8 sign-octants around the
/// AABB center; bucket id is a 3-bit `zyx` sign code.
fn octant_buckets(source: &Geometry) -> [Vec<u32>; 8] {
    let center = source
        .bounds
        .map_or_else(|| position_aabb(source).center(), |b| b.aabb.center());

    let mut buckets: [Vec<u32>; 8] = Default::default();
    for t in 0..source.triangle_count() {
        let [a, b, c] = source.triangle(t);
        let centroid = (source.position(a as usize)
            + source.position(b as usize)
            + source.position(c as usize))
            / 3.0;
        let d = centroid - center;
        let bucket = usize::from(d.x > 0.0)
            | (usize::from(d.y > 0.0) << 1)
            | (usize::from(d.z > 0.0) << 2);
        buckets[bucket].extend([a, b, c]);
    }
    buckets
}

fn position_aabb(source: &Geometry) -> Aabb {
    let count = source.vertex_count();
    Aabb::from_points((0..count).map(|i| source.position(i)))
}

/// Materialize one part: insert its geometry, resolve and convert its
/// material, and build the (still unattached) node.
#[allow(clippy::too_many_arguments)]
fn build_part(
    scene: &mut Scene,
    mesh: &MeshData,
    skin: Option<(asmview_scene::SkeletonId, glam::Mat4)>,
    geometry: Geometry,
    material_index: usize,
    label: &str,
    part_index: usize,
    materials: &mut MaterialCache,
) -> Part {
    let geometry_id = scene.add_geometry(geometry);
    let material = resolve_material(mesh, material_index, label)
        .map(|source| materials.safe_material(scene, source));

    let part_mesh = MeshData {
        geometry: geometry_id,
        materials: material.into_iter().collect(),
    };
    let kind = match skin {
        Some((skeleton, bind_matrix)) => NodeKind::SkinnedMesh(SkinnedMeshData {
            mesh: part_mesh,
            skeleton,
            bind_matrix,
        }),
        None => NodeKind::Mesh(part_mesh),
    };

    Part {
        node: Node::named(&format!("{label}.part{part_index}"), kind),
        geometry: geometry_id,
    }
}

/// Group material slot, falling back to the mesh's first slot when the
/// authored index is out of range.
fn resolve_material(mesh: &MeshData, material_index: usize, label: &str) -> Option<MaterialId> {
    if let Some(&id) = mesh.materials.get(material_index) {
        return Some(id);
    }
    if let Some(&first) = mesh.materials.first() {
        tracing::warn!(
            mesh = %label,
            material_index,
            "material index out of range, using first slot"
        );
        return Some(first);
    }
    None
}
