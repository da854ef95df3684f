mod nexus_test;
use nexus_test::*;

nexus_test!(construct_and_use_fields
"
class Counter:
{ function init():
  { this.n = 0
  }
  function inc():
  { this.n = this.n + 1
  }
}
let c = Counter()
c.inc()
c.inc()
let n = c.n
"
  n == 2.0
);

nexus_test!(init_receives_constructor_arguments
"
class Point:
{ function init(x, y):
  { this.x = x
    this.y = y
  }
}
let p = Point(3, 4)
let x = p.x
let y = p.y
"
  x == 3.0
  y == 4.0
);

nexus_test!(constructor_arity_is_checked
"
class Point:
{ function init(x, y):
  { this.x = x
    this.y = y
  }
}
let p = Point(3)
"
  RuntimeError
);

nexus_test!(class_without_init_takes_no_arguments
"
class Empty:
{ }
let e = Empty()
let t = type(e)
"
  t == "instance"
);

nexus_test!(methods_return_values
"
class Square:
{ function init(side):
  { this.side = side
  }
  function area():
  { return this.side * this.side
  }
}
let area = Square(5).area()
"
  area == 25.0
);

nexus_test!(field_writes_target_the_instance
"
class Box:
{ }
let a = Box()
let b = Box()
a.value = 1
b.value = 2
let first = a.value
let second = b.value
"
  first == 1.0
  second == 2.0
);

nexus_test!(missing_property_errors
"
class Box:
{ }
let b = Box()
let crash = b.missing
"
  RuntimeError
);

nexus_test!(property_access_on_non_instance_errors
"
let x = 5
let crash = x.field
"
  RuntimeError
);

nexus_test!(field_write_on_non_instance_errors
"
let x = 5
x.field = 1
"
  RuntimeError
);

nexus_test!(bound_methods_carry_their_instance
"
class Greeter:
{ function init(name):
  { this.name = name
  }
  function greet():
  { return \"hi \" + this.name
  }
}
let g = Greeter(\"ada\")
let method = g.greet
let result = method()
"
  result == "hi ada"
);

nexus_test!(fields_shadow_methods
"
class Thing:
{ function label():
  { return \"method\"
  }
}
let t = Thing()
t.label = lambda ():
\"field\"
let result = t.label()
"
  result == "field"
);

nexus_test!(inheritance_finds_superclass_methods
"
class Animal:
{ function speak():
  { return \"generic\"
  }
}
class Dog extends Animal:
{ }
let sound = Dog().speak()
"
  sound == "generic"
);

nexus_test!(subclass_overrides_methods
"
class Animal:
{ function speak():
  { return \"generic\"
  }
}
class Dog extends Animal:
{ function speak():
  { return \"woof\"
  }
}
let sound = Dog().speak()
"
  sound == "woof"
);

nexus_test!(super_calls_superclass_method
"
class Animal:
{ function speak():
  { return \"generic\"
  }
}
class Dog extends Animal:
{ function speak():
  { return \"woof then \" + super.speak()
  }
}
let sound = Dog().speak()
"
  sound == "woof then generic"
);

nexus_test!(super_binds_the_current_instance
"
class Base:
{ function describe():
  { return \"value=\" + this.value
  }
}
class Derived extends Base:
{ function init(value):
  { this.value = value
  }
  function describe():
  { return super.describe()
  }
}
let result = Derived(9).describe()
"
  result == "value=9"
);

nexus_test!(inherited_init_runs_for_subclass
"
class Base:
{ function init():
  { this.tag = \"base\"
  }
}
class Derived extends Base:
{ }
let tag = Derived().tag
"
  tag == "base"
);

nexus_test!(superclass_must_be_a_class
"
let NotAClass = 5
class Broken extends NotAClass:
{ }
"
  RuntimeError
);

nexus_test!(this_outside_a_method_errors
"
let crash = this
"
  RuntimeError
);

nexus_test!(classes_are_first_class_values
"
class Box:
{ }
let alias = Box
let b = alias()
let t = type(Box)
let i = type(b)
"
  t == "class"
  i == "instance"
);

nexus_test!(instances_compare_by_identity
"
class Box:
{ }
let a = Box()
let b = Box()
let alias = a
let different = a == b
let same = a == alias
"
  different == false
  same == true
);

nexus_test!(methods_may_reference_the_class_recursively
"
class Node:
{ function make_child():
  { return Node()
  }
}
let child = Node().make_child()
let t = type(child)
"
  t == "instance"
);

nexus_test!(instance_fields_may_hold_closures_capturing_the_instance
"
class Widget:
{ function init():
  { this.count = 0
  }
}
let w = Widget()
w.bump = lambda ():
w.count = w.count + 1
w.bump()
w.bump()
let count = w.count
"
  count == 2.0
);
