#![allow(dead_code)]

use acudb_database::{Change, LoadOptions, PointDatabase};
use std::cell::RefCell;
use std::rc::Rc;

pub const MERIDIANS: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<database name="Meridians">
  <images>
    <image id="front" title="Front view" path="images/front.jpg"/>
    <image id="side" title="Side view" path="images/side.jpg"/>
  </images>
  <views>
    <view name="Arms">
      <group>arm_left</group>
      <group>arm_right</group>
    </view>
    <view name="Legs">
      <group>leg_left</group>
    </view>
  </views>
  <points>
    <point id="LI10">
      <tags><tag name="arm"/><tag name="yang"/></tags>
      <position x="1.5" y="2" z="-3.25"/>
      <description>Arm Three Li</description>
      <color>red</color>
    </point>
    <point id="ST36">
      <tags><tag name="leg"/><tag name="yang"/></tags>
      <position x="0" y="-40" z="2"/>
      <image-position image="front" x="120" y="800.5"/>
      <image-position image="side" x="64" y="790"/>
      <description>Leg Three Li</description>
      <color>#00ff00</color>
    </point>
    <point id="LI4">
      <tags><tag name="hand"/><tag name="yang"/></tags>
      <position x="4" y="5" z="6"/>
      <image-position image="front" x="10" y="20"/>
      <description>Union Valley</description>
      <color>blue</color>
    </point>
    <point id="LI11">
      <tags><tag name="arm"/></tags>
      <position x="7" y="8" z="9"/>
      <description>Pool at the Crook</description>
      <color>#123456</color>
    </point>
  </points>
</database>
"##;

pub fn loaded() -> PointDatabase {
    let mut db = PointDatabase::new();
    db.load(MERIDIANS, &LoadOptions::default()).expect("load sample");
    db
}

pub fn record(db: &mut PointDatabase) -> Rc<RefCell<Vec<Change>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    db.subscribe(move |_: &PointDatabase, change: &Change| {
        sink.borrow_mut().push(change.clone());
    });
    log
}

pub fn ids(db: &PointDatabase) -> Vec<&str> {
    db.points().iter().map(|p| p.id.as_str()).collect()
}

pub const CUBE_OBJ: &str = "\
o Body
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 2
vn 0 0 1
vt 0 0
g torso
f 1/1/1 2/1/1 3/1/1
f 1/1/1 3/1/1 4/1/1
";
