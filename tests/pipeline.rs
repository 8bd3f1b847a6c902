use std::fs;

use tdrmesh::parser::tdr::MemorySource;
use tdrmesh::topology::RepairAction;
use tdrmesh::writer::{ExodusModel, GmshWriter, TetgenWriter, VTUWriter};
use tdrmesh::{convert, ConvertError, ConvertOptions, TopologyError};

/// Two unit squares side by side with one contact along the whole bottom edge
fn two_squares() -> MemorySource {
    let mut source = MemorySource::device(
        2,
        2,
        vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0],
    );
    source.add_region("left", 0, Some("Silicon"), &[], vec![2, 0, 1, 4, 2, 0, 4, 3]);
    source.add_region("right", 0, Some("Silicon"), &[], vec![2, 1, 2, 5, 2, 1, 5, 4]);
    source.add_region("bottom", 1, None, &[0], vec![1, 0, 1, 1, 1, 2]);
    source.add_dataset("Potential", 0, 0, 0, None, vec![0.0, 0.1, 0.3, 0.4]);
    source.add_dataset("Potential", 1, 0, 0, None, vec![1.1, 1.2, 1.4, 1.5]);
    source
}

/// Two tetrahedra glued on one face with a contact on the first
fn two_tetrahedra() -> MemorySource {
    let mut source = MemorySource::device(
        3,
        3,
        vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0,
        ],
    );
    source.add_region("a", 0, Some("Silicon"), &[], vec![5, 0, 1, 2, 3]);
    source.add_region("b", 0, Some("Oxide"), &[], vec![5, 4, 3, 2, 1]);
    source.add_region("gate", 1, None, &[0], vec![2, 0, 1, 2]);
    source
}

#[test]
fn straddling_contact_is_split_and_interface_found() {
    let conversion = convert(&two_squares(), &ConvertOptions::default()).unwrap();
    let mesh = &conversion.mesh;

    assert_eq!(
        mesh.physical_names,
        vec!["left", "right", "bottom_left", "bottom_right", "left_right"]
    );
    assert_eq!(mesh.num_elements(), 7);

    let physical: Vec<usize> = mesh.elements.iter().map(|e| e.physical_index).collect();
    assert_eq!(physical, vec![0, 0, 1, 1, 2, 3, 4]);

    assert!(matches!(
        &conversion.report.actions[0],
        RepairAction::ContactSplit { contact, parts } if contact == "bottom" && parts.len() == 2
    ));
    assert!(matches!(
        &conversion.report.actions[1],
        RepairAction::InterfaceSynthesized { interface, .. } if interface == "left_right"
    ));

    assert_eq!(mesh.blocks[3].bulk_names, vec!["right"]);
    assert_eq!(mesh.blocks[4].bulk_names, vec!["left", "right"]);
    assert_eq!(mesh.block_elements(&mesh.blocks[4])[0].nodes, vec![1, 4]);
}

#[test]
fn gmsh_output_numbers_from_one() {
    let conversion = convert(&two_squares(), &ConvertOptions::default().with_scale(2.0)).unwrap();

    let mut buffer = Vec::new();
    GmshWriter::write_to(&mut buffer, &conversion.mesh).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    let elements: Vec<&str> = text
        .lines()
        .skip_while(|l| *l != "$Elements")
        .skip(2)
        .take_while(|l| *l != "$EndElements")
        .collect();
    assert_eq!(elements.len(), 7);

    // contacts, then the interface, then the bulk regions
    assert_eq!(elements[0], "1 1 2 1 1 1 2");
    assert_eq!(elements[1], "2 1 2 2 2 2 3");
    assert_eq!(elements[2], "3 1 2 3 3 2 5");
    assert_eq!(elements[3], "4 2 2 4 4 1 2 5");

    for line in &elements {
        let fields: Vec<usize> = line.split(' ').map(|f| f.parse().unwrap()).collect();
        for node in &fields[5..] {
            assert!((1..=6).contains(node));
        }
    }

    // coordinates are scaled by 2
    assert!(text.contains("\n6 4 2 0\n"));
    assert!(text.contains("\n1 3 \"left_right\"\n"));
}

#[test]
fn dropping_interfaces_at_contact_can_empty_an_interface() {
    let options = ConvertOptions::default().with_drop_interfaces_at_contact(true);
    let err = convert(&two_squares(), &options).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Topology(TopologyError::VanishedInterface { ref interface }) if interface == "left_right"
    ));
}

#[test]
fn datasets_merge_onto_global_nodes() {
    let options = ConvertOptions::default().with_load_datasets(true);
    let conversion = convert(&two_squares(), &options).unwrap();
    assert_eq!(conversion.datasets.len(), 2);

    let fields = conversion.mesh.node_fields(&conversion.datasets);
    assert_eq!(fields.len(), 1);
    // nodes 1 and 4 belong to both squares, the right one is merged last
    assert_eq!(fields[0].values, vec![0.0, 1.1, 1.2, 0.3, 1.4, 1.5]);

    let model = ExodusModel::build(&conversion.mesh, fields.clone()).unwrap();
    assert_eq!(model.blocks.len(), 2);
    assert_eq!(model.node_variables[0].name, "Potential");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.vtu");
    VTUWriter::write_vtu(&conversion.mesh, &fields, &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("Potential"));
}

#[test]
fn tetgen_output_for_a_3d_device() {
    let conversion = convert(&two_tetrahedra(), &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.mesh.physical_names, vec!["a", "b", "gate", "a_b"]);

    let dir = tempfile::tempdir().unwrap();
    let basename = dir.path().join("device");
    TetgenWriter::write(&conversion.mesh, &basename).unwrap();

    let ele = fs::read_to_string(dir.path().join("device.ele")).unwrap();
    assert_eq!(ele, "2 4 1\n1 1 2 3 4 3\n2 5 4 3 2 4\n");

    let face = fs::read_to_string(dir.path().join("device.face")).unwrap();
    assert_eq!(face, "2 1\n1 1 2 3 1\n2 2 3 4 2\n");

    let node = fs::read_to_string(dir.path().join("device.node")).unwrap();
    assert!(node.starts_with("5 3 0 0\n1 0 0 0\n"));
}
